//! Roster payload: who drafted which riders.

use serde::{Deserialize, Serialize};

use super::RosterId;

/// A drafted rider reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderPick {
    pub name: String,
    #[serde(default)]
    pub team: String,
}

impl RiderPick {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
        }
    }
}

/// One participant's draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub riders: Vec<RiderPick>,
}

/// Participants plus the rider universe.
///
/// When `riders` is empty the universe is derived from the picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RosterPayload {
    #[serde(default)]
    pub participants: Vec<RosterEntry>,

    #[serde(default)]
    pub riders: Vec<RiderPick>,
}

impl RosterPayload {
    /// Builder method to add a participant with their picks.
    pub fn with_participant(mut self, name: &str, picks: &[(&str, &str)]) -> Self {
        self.participants.push(RosterEntry {
            name: name.to_string(),
            riders: picks
                .iter()
                .map(|(rider, team)| RiderPick::new(*rider, *team))
                .collect(),
        });
        self
    }

    /// Builder method to add a rider to the universe.
    pub fn with_rider(mut self, name: &str, team: &str) -> Self {
        self.riders.push(RiderPick::new(name, team));
        self
    }

    /// The rider universe: explicit riders, or the distinct picks in draft order.
    pub fn universe(&self) -> Vec<RiderPick> {
        if !self.riders.is_empty() {
            return self.riders.clone();
        }

        let mut seen = std::collections::HashSet::new();
        self.participants
            .iter()
            .flat_map(|p| p.riders.iter())
            .filter(|pick| seen.insert(pick.name.clone()))
            .cloned()
            .collect()
    }

    /// Fingerprint of participant names and picks.
    pub fn roster_id(&self) -> RosterId {
        RosterId::from_draft(self.participants.iter().map(|entry| {
            (
                entry.name.as_str(),
                entry.riders.iter().map(|pick| pick.name.as_str()).collect(),
            )
        }))
    }
}
