//! Ranking snapshots and progression.

use serde::{Deserialize, Serialize};

/// An item annotated with its competition rank (1 = best).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranked<T> {
    pub rank: u32,
    pub score: u32,
    #[serde(flatten)]
    pub item: T,
}

/// One participant's standing at one stage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRankingEntry {
    pub name: String,

    /// Cumulative points through this stage
    pub total_points: u32,

    /// Points scored in this stage alone
    pub stage_points: u32,

    pub rank: u32,
}

/// All participants' standings after one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRanking {
    /// Stage number (1-indexed)
    pub stage: u32,

    /// Entries in rank order
    pub entries: Vec<StageRankingEntry>,
}

impl StageRanking {
    pub fn entry(&self, name: &str) -> Option<&StageRankingEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Stage-by-stage standings, one element per completed stage.
pub type RankingHistory = Vec<StageRanking>;

/// One participant's rank at one stage, with the move since the previous stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionPoint {
    pub stage: u32,
    pub rank: u32,
    pub total_points: u32,

    /// `rank - previous rank`; negative means moved up. None for the first stage.
    pub position_change: Option<i64>,
}

/// A participant's full ranking timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProgression {
    pub name: String,
    pub timeline: Vec<ProgressionPoint>,

    /// Rank at the last completed stage
    pub current_ranking: Option<u32>,
}

impl ParticipantProgression {
    /// Best (lowest) rank ever held.
    pub fn best_rank(&self) -> Option<u32> {
        self.timeline.iter().map(|p| p.rank).min()
    }

    /// Latest position change, if there were at least two stages.
    pub fn last_change(&self) -> Option<i64> {
        self.timeline.last().and_then(|p| p.position_change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(stage: u32, rank: u32, change: Option<i64>) -> ProgressionPoint {
        ProgressionPoint {
            stage,
            rank,
            total_points: 0,
            position_change: change,
        }
    }

    #[test]
    fn test_progression_best_rank_and_last_change() {
        let progression = ParticipantProgression {
            name: "Anna".to_string(),
            timeline: vec![point(1, 3, None), point(2, 1, Some(-2)), point(3, 2, Some(1))],
            current_ranking: Some(2),
        };

        assert_eq!(progression.best_rank(), Some(1));
        assert_eq!(progression.last_change(), Some(1));
    }

    #[test]
    fn test_ranked_flattens_item() {
        #[derive(Serialize)]
        struct Item {
            name: &'static str,
        }

        let ranked = Ranked {
            rank: 1,
            score: 50,
            item: Item { name: "Anna" },
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["name"], "Anna");
        assert_eq!(json["rank"], 1);
    }

    #[test]
    fn test_stage_ranking_entry_lookup() {
        let ranking = StageRanking {
            stage: 1,
            entries: vec![StageRankingEntry {
                name: "Anna".to_string(),
                total_points: 30,
                stage_points: 30,
                rank: 1,
            }],
        };
        assert_eq!(ranking.entry("Anna").map(|e| e.rank), Some(1));
        assert!(ranking.entry("Bram").is_none());
    }
}
