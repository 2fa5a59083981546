//! Exported/persisted race snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Participant, RaceState, Rider, RiderSummary, RosterId};

/// Everything needed to restore a race: the on-disk and export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub participants: Vec<Participant>,
    pub all_riders: Vec<RiderSummary>,
    pub current_stage: u32,
    pub export_date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster_id: Option<RosterId>,
}

impl ExportSnapshot {
    /// Rebuild the race state. Derived fields need a recompute afterwards.
    pub fn to_state(&self) -> RaceState {
        RaceState {
            participants: self.participants.clone(),
            riders: self.all_riders.iter().map(RiderSummary::to_rider).collect::<Vec<Rider>>(),
            current_stage: self.current_stage,
            roster_id: self.roster_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiderStatus, STAGE_SLOTS};

    #[test]
    fn test_snapshot_uses_export_field_names() {
        let snapshot = ExportSnapshot {
            participants: vec![],
            all_riders: vec![],
            current_stage: 3,
            export_date: Utc::now(),
            roster_id: None,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("allRiders").is_some());
        assert_eq!(json["currentStage"], 3);
        assert!(json.get("exportDate").is_some());
        assert!(json.get("rosterId").is_none());
    }

    #[test]
    fn test_snapshot_to_state_keeps_rider_status() {
        let snapshot = ExportSnapshot {
            participants: vec![Participant::new("A")],
            all_riders: vec![RiderSummary {
                name: "X".to_string(),
                team: "UAE".to_string(),
                points: [5; STAGE_SLOTS],
                status: RiderStatus::Dropped,
                in_team: false,
                selected_by: 0,
                total_points: 110,
            }],
            current_stage: 2,
            export_date: Utc::now(),
            roster_id: None,
        };

        let state = snapshot.to_state();
        assert_eq!(state.current_stage, 2);
        assert_eq!(state.riders[0].status, RiderStatus::Dropped);
        assert_eq!(state.riders[0].points[0], 5);
        assert_eq!(state.participants.len(), 1);
    }
}
