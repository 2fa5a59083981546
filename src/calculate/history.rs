//! Stage-by-stage ranking history and per-participant progression.
//!
//! The whole history is rebuilt on every call. Corrections can arrive for any
//! stage in any order, and race sizes are small enough that a full rebuild
//! costs nothing noticeable.

use std::collections::HashMap;

use super::ranking::competition_rank;
use crate::models::{
    sum_live, Participant, ParticipantProgression, ProgressionPoint, RaceState, RankingHistory,
    StageRanking, StageRankingEntry, STAGE_SLOTS,
};

/// Rank participants on cumulative points after each completed stage.
///
/// Expects participant stage points to be recomputed.
pub fn build_ranking_history(state: &RaceState) -> RankingHistory {
    let live = state.live_slots().min(STAGE_SLOTS);
    let mut history = Vec::with_capacity(live);

    let mut cumulative: Vec<u32> = vec![0; state.participants.len()];
    for slot in 0..live {
        for (total, participant) in cumulative.iter_mut().zip(&state.participants) {
            *total = total.saturating_add(participant.stage_points[slot]);
        }

        let standings: Vec<(usize, u32)> = cumulative.iter().copied().enumerate().collect();
        let entries = competition_rank(standings, |(_, total)| *total)
            .into_iter()
            .map(|ranked| {
                let participant = &state.participants[ranked.item.0];
                StageRankingEntry {
                    name: participant.name.clone(),
                    total_points: ranked.score,
                    stage_points: participant.stage_points[slot],
                    rank: ranked.rank,
                }
            })
            .collect();

        history.push(StageRanking {
            stage: slot as u32 + 1,
            entries,
        });
    }

    history
}

/// Walk the history per participant and compute rank moves between stages.
///
/// Output follows the participant order of `state`.
pub fn ranking_progression(state: &RaceState, history: &RankingHistory) -> Vec<ParticipantProgression> {
    let mut timelines: HashMap<&str, Vec<ProgressionPoint>> = state
        .participants
        .iter()
        .map(|p| (p.name.as_str(), Vec::with_capacity(history.len())))
        .collect();

    for stage in history {
        for entry in &stage.entries {
            if let Some(timeline) = timelines.get_mut(entry.name.as_str()) {
                let position_change = timeline
                    .last()
                    .map(|prev| i64::from(entry.rank) - i64::from(prev.rank));
                timeline.push(ProgressionPoint {
                    stage: stage.stage,
                    rank: entry.rank,
                    total_points: entry.total_points,
                    position_change,
                });
            }
        }
    }

    state
        .participants
        .iter()
        .map(|p| {
            let timeline = timelines.remove(p.name.as_str()).unwrap_or_default();
            ParticipantProgression {
                name: p.name.clone(),
                current_ranking: timeline.last().map(|point| point.rank),
                timeline,
            }
        })
        .collect()
}

/// Ranking on points scored in a single stage (1-indexed), best first.
///
/// Returns entries for every participant; callers take the podium themselves.
pub fn stage_ranking(state: &RaceState, stage: u32) -> Option<StageRanking> {
    let slot = crate::models::slot_for_stage(stage).filter(|&slot| slot < state.live_slots())?;

    let participants: Vec<&Participant> = state.participants.iter().collect();
    let entries = competition_rank(participants, |p| p.stage_points[slot])
        .into_iter()
        .map(|ranked| StageRankingEntry {
            name: ranked.item.name.clone(),
            total_points: sum_live(&ranked.item.stage_points, slot + 1),
            stage_points: ranked.score,
            rank: ranked.rank,
        })
        .collect();

    Some(StageRanking { stage, entries })
}
