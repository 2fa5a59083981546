//! Pool participant model.

use serde::{Deserialize, Serialize};

use super::{Rider, StagePoints, STAGE_SLOTS};

/// Maximum number of riders a participant may draft.
pub const MAX_TEAM_SIZE: usize = 12;

/// A pool participant and the riders they drafted.
///
/// `team` holds copies of the universe riders, not references. Whoever
/// mutates rider points must update both copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,

    #[serde(default)]
    pub total_points: u32,

    #[serde(default)]
    pub daily_wins: u32,

    #[serde(default = "empty_points")]
    pub stage_points: StagePoints,

    #[serde(default)]
    pub team: Vec<Rider>,
}

fn empty_points() -> StagePoints {
    [0; STAGE_SLOTS]
}

impl Participant {
    /// Create a participant with an empty team.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_points: 0,
            daily_wins: 0,
            stage_points: empty_points(),
            team: Vec::new(),
        }
    }

    /// Builder method to add a rider to the team.
    pub fn with_rider(mut self, rider: Rider) -> Self {
        self.team.push(rider);
        self
    }

    /// Find a team entry by exact name.
    pub fn rider(&self, name: &str) -> Option<&Rider> {
        self.team.iter().find(|r| r.name == name)
    }
}
