//! Rider model.

use serde::{Deserialize, Serialize};

/// Number of point slots per rider: stages 1-21 plus the final classification.
pub const STAGE_SLOTS: usize = 22;

/// Highest regular stage number.
pub const LAST_STAGE: u32 = 21;

/// Stage number reserved for the final overall classification.
pub const FINAL_CLASSIFICATION: u32 = 22;

/// Points per slot. Slot `i` holds stage `i + 1`; unset stages are 0.
pub type StagePoints = [u32; STAGE_SLOTS];

/// Sum the first `live` slots of a point array.
///
/// Slots at or beyond `live` are ignored even when nonzero.
pub fn sum_live(points: &StagePoints, live: usize) -> u32 {
    saturating_sum(points.iter().take(live.min(STAGE_SLOTS)).copied())
}

/// Sum that clamps at `u32::MAX` instead of overflowing.
pub fn saturating_sum(points: impl IntoIterator<Item = u32>) -> u32 {
    points.into_iter().fold(0, u32::saturating_add)
}

/// Whether a rider is still in the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiderStatus {
    #[default]
    Active,
    /// Withdrawn. Past points stay; there is no way back to active.
    Dropped,
}

impl std::fmt::Display for RiderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiderStatus::Active => write!(f, "active"),
            RiderStatus::Dropped => write!(f, "dropped"),
        }
    }
}

/// A rider in the race, with points for every stage slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rider {
    pub name: String,

    /// Professional team (e.g. "UAE Team Emirates")
    pub team: String,

    pub points: StagePoints,

    #[serde(default)]
    pub status: RiderStatus,
}

impl Rider {
    /// Create an active rider with no points.
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            points: [0; STAGE_SLOTS],
            status: RiderStatus::Active,
        }
    }

    /// Builder method to set points for a stage (1-indexed).
    pub fn with_stage_points(mut self, stage: u32, points: u32) -> Self {
        if let Some(slot) = slot_for_stage(stage) {
            self.points[slot] = points;
        }
        self
    }

    /// Builder method to mark the rider as dropped.
    pub fn dropped(mut self) -> Self {
        self.status = RiderStatus::Dropped;
        self
    }

    pub fn is_dropped(&self) -> bool {
        self.status == RiderStatus::Dropped
    }

    /// Points over the first `live` slots.
    pub fn total_points(&self, live: usize) -> u32 {
        sum_live(&self.points, live)
    }
}

/// A rider as shown in the all-riders overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderSummary {
    pub name: String,
    pub team: String,
    pub points: StagePoints,
    #[serde(default)]
    pub status: RiderStatus,

    /// Drafted by at least one participant
    #[serde(default)]
    pub in_team: bool,

    /// Number of participants who drafted this rider
    #[serde(default)]
    pub selected_by: u32,

    #[serde(default)]
    pub total_points: u32,
}

impl RiderSummary {
    /// Strip the overview fields, keeping the rider itself.
    pub fn to_rider(&self) -> Rider {
        Rider {
            name: self.name.clone(),
            team: self.team.clone(),
            points: self.points,
            status: self.status,
        }
    }
}

/// Map a 1-indexed stage number to its slot, if it is in range.
pub fn slot_for_stage(stage: u32) -> Option<usize> {
    if (1..=FINAL_CLASSIFICATION).contains(&stage) {
        Some(stage as usize - 1)
    } else {
        None
    }
}
