//! Scoring and ranking engine.
//!
//! Pure transformations over [`RaceState`]:
//! - Stage result application (placings, jersey bonuses, dropouts)
//! - Participant totals and the all-riders overview
//! - Daily wins with shared wins on ties
//! - Competition ranking and the stage-by-stage ranking history

pub mod aggregate;
pub mod apply;
pub mod daily_wins;
pub mod history;
pub mod lookup;
pub mod ranking;

pub use aggregate::{all_riders, recompute_participants};
pub use apply::{apply_resolved, apply_stage, resolve_stage, ApplySummary, ResolvedStage};
pub use daily_wins::{recompute_daily_wins, stage_winners};
pub use history::{build_ranking_history, ranking_progression, stage_ranking};
pub use lookup::{normalize_name, Resolution, RiderIndex};
pub use ranking::{competition_rank, ranks_for_scores};

use serde::Serialize;
use tracing::debug;

use crate::models::{ParticipantProgression, RaceState, RankingHistory, RiderSummary};

/// Views derived from a race state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedViews {
    pub all_riders: Vec<RiderSummary>,
    pub ranking_history: RankingHistory,
    pub ranking_progression: Vec<ParticipantProgression>,
}

/// Full recompute after any write: totals, daily wins, then the derived views.
pub fn recompute(state: &mut RaceState) -> DerivedViews {
    recompute_participants(state);
    recompute_daily_wins(state);

    let ranking_history = build_ranking_history(state);
    let ranking_progression = ranking_progression(state, &ranking_history);
    let all_riders = all_riders(state);

    debug!(
        "Recomputed {} participants over {} stages",
        state.participants.len(),
        state.current_stage
    );

    DerivedViews {
        all_riders,
        ranking_history,
        ranking_progression,
    }
}
