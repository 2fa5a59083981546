//! The race aggregate: participants, rider universe and stage counter.

use serde::{Deserialize, Serialize};

use super::{Participant, Rider, RosterId, RosterPayload};

/// All mutable race data.
///
/// Engine operations take this by reference. After any write the derived
/// fields (participant totals, daily wins) are stale until recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RaceState {
    pub participants: Vec<Participant>,

    /// Every rider in the race, drafted or not
    pub riders: Vec<Rider>,

    /// Highest stage with loaded results; 0 before the first stage
    pub current_stage: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster_id: Option<RosterId>,
}

impl RaceState {
    /// Build a fresh state from a roster. Does not validate.
    pub fn from_roster(roster: &RosterPayload) -> Self {
        let riders: Vec<Rider> = roster
            .universe()
            .into_iter()
            .map(|pick| Rider::new(pick.name, pick.team))
            .collect();

        let participants = roster
            .participants
            .iter()
            .map(|entry| {
                let team = entry
                    .riders
                    .iter()
                    .map(|pick| {
                        riders
                            .iter()
                            .find(|r| r.name == pick.name)
                            .cloned()
                            .unwrap_or_else(|| Rider::new(pick.name.clone(), pick.team.clone()))
                    })
                    .collect();
                Participant {
                    team,
                    ..Participant::new(entry.name.clone())
                }
            })
            .collect();

        Self {
            participants,
            riders,
            current_stage: 0,
            roster_id: Some(roster.roster_id()),
        }
    }

    /// Number of point slots that count in aggregates.
    pub fn live_slots(&self) -> usize {
        self.current_stage as usize
    }

    pub fn rider(&self, name: &str) -> Option<&Rider> {
        self.riders.iter().find(|r| r.name == name)
    }

    pub fn participant(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    /// Apply `f` to the universe entry and every team entry named `name`.
    ///
    /// Returns the number of entries touched.
    pub fn for_each_rider_mut(&mut self, name: &str, mut f: impl FnMut(&mut Rider)) -> usize {
        let mut touched = 0;
        for rider in self.riders.iter_mut().filter(|r| r.name == name) {
            f(rider);
            touched += 1;
        }
        for participant in &mut self.participants {
            for rider in participant.team.iter_mut().filter(|r| r.name == name) {
                f(rider);
                touched += 1;
            }
        }
        touched
    }

    /// Overwrite team copies with the universe entry of the same name.
    ///
    /// Used after loading data from outside, where the copies may have drifted.
    pub fn sync_teams_from_universe(&mut self) {
        let riders = &self.riders;
        for participant in &mut self.participants {
            for entry in &mut participant.team {
                if let Some(rider) = riders.iter().find(|r| r.name == entry.name) {
                    entry.points = rider.points;
                    entry.status = rider.status;
                }
            }
        }
    }

    /// Apply `f` to every rider entry, universe and teams alike.
    pub fn for_all_riders_mut(&mut self, mut f: impl FnMut(&mut Rider)) {
        self.riders.iter_mut().for_each(&mut f);
        for participant in &mut self.participants {
            participant.team.iter_mut().for_each(&mut f);
        }
    }
}
