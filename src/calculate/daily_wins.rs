//! Daily wins: who had the best stage.

use crate::models::{RaceState, STAGE_SLOTS};

/// Reset and recount every participant's daily wins.
///
/// All participants sharing the stage maximum get a win. A stage where
/// nobody scored awards nothing. Expects stage points to be recomputed.
pub fn recompute_daily_wins(state: &mut RaceState) {
    for participant in &mut state.participants {
        participant.daily_wins = 0;
    }

    let live = state.live_slots().min(STAGE_SLOTS);
    for slot in 0..live {
        let max_points = state
            .participants
            .iter()
            .map(|p| p.stage_points[slot])
            .max()
            .unwrap_or(0);

        if max_points == 0 {
            continue;
        }

        for participant in &mut state.participants {
            if participant.stage_points[slot] == max_points {
                participant.daily_wins += 1;
            }
        }
    }
}

/// Names of the participants who won a stage (1-indexed). Empty when nobody scored.
pub fn stage_winners(state: &RaceState, stage: u32) -> Vec<&str> {
    let slot = match crate::models::slot_for_stage(stage) {
        Some(slot) if slot < state.live_slots() => slot,
        _ => return Vec::new(),
    };

    let max_points = state
        .participants
        .iter()
        .map(|p| p.stage_points[slot])
        .max()
        .unwrap_or(0);
    if max_points == 0 {
        return Vec::new();
    }

    state
        .participants
        .iter()
        .filter(|p| p.stage_points[slot] == max_points)
        .map(|p| p.name.as_str())
        .collect()
}
