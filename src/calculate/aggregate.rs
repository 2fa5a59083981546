//! Participant totals and the all-riders overview.
//!
//! Everything here is recomputed from the rider point arrays; nothing is
//! patched incrementally, so calling it twice gives the same result.

use std::collections::HashMap;

use crate::models::{saturating_sum, sum_live, RaceState, RiderSummary, RiderStatus, STAGE_SLOTS};

/// Recompute every participant's stage points and total, then sort
/// participants by total (descending, stable).
pub fn recompute_participants(state: &mut RaceState) {
    let live = state.live_slots().min(STAGE_SLOTS);

    for participant in &mut state.participants {
        let mut stage_points = [0; STAGE_SLOTS];
        for (slot, points) in stage_points.iter_mut().enumerate().take(live) {
            *points = saturating_sum(participant.team.iter().map(|r| r.points[slot]));
        }
        participant.stage_points = stage_points;
        participant.total_points = sum_live(&stage_points, live);
    }

    state
        .participants
        .sort_by(|a, b| b.total_points.cmp(&a.total_points));
}

/// Build the all-riders overview: the full universe with team overlay,
/// sorted by total points over the live slots (descending, stable).
pub fn all_riders(state: &RaceState) -> Vec<RiderSummary> {
    let live = state.live_slots();

    let mut selections: HashMap<&str, (u32, RiderStatus)> = HashMap::new();
    for rider in state.participants.iter().flat_map(|p| p.team.iter()) {
        let entry = selections
            .entry(rider.name.as_str())
            .or_insert((0, RiderStatus::Active));
        entry.0 += 1;
        if rider.is_dropped() {
            entry.1 = RiderStatus::Dropped;
        }
    }

    let mut summaries: Vec<RiderSummary> = state
        .riders
        .iter()
        .map(|rider| {
            let (selected_by, team_status) = selections
                .get(rider.name.as_str())
                .copied()
                .unwrap_or((0, RiderStatus::Active));
            let status = if rider.is_dropped() || team_status == RiderStatus::Dropped {
                RiderStatus::Dropped
            } else {
                RiderStatus::Active
            };

            RiderSummary {
                name: rider.name.clone(),
                team: rider.team.clone(),
                points: rider.points,
                status,
                in_team: selected_by > 0,
                selected_by,
                total_points: rider.total_points(live),
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Participant, Rider};
    use pretty_assertions::assert_eq;

    fn state() -> RaceState {
        let x = Rider::new("X", "UAE")
            .with_stage_points(1, 30)
            .with_stage_points(2, 10);
        let y = Rider::new("Y", "Visma").with_stage_points(1, 25);
        let z = Rider::new("Z", "Ineos").with_stage_points(2, 50);

        RaceState {
            participants: vec![
                Participant::new("A").with_rider(y.clone()),
                Participant::new("B").with_rider(x.clone()).with_rider(y.clone()),
            ],
            riders: vec![x, y, z],
            current_stage: 2,
            roster_id: None,
        }
    }

    #[test]
    fn test_stage_points_and_totals() {
        let mut state = state();
        recompute_participants(&mut state);

        let b = state.participant("B").unwrap();
        assert_eq!(b.stage_points[0], 55);
        assert_eq!(b.stage_points[1], 10);
        assert_eq!(b.total_points, 65);

        let a = state.participant("A").unwrap();
        assert_eq!(a.total_points, 25);
    }

    #[test]
    fn test_participants_sorted_descending() {
        let mut state = state();
        recompute_participants(&mut state);

        let names: Vec<&str> = state.participants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_tied_participants_keep_prior_order() {
        let rider = Rider::new("X", "UAE").with_stage_points(1, 30);
        let mut state = RaceState {
            participants: vec![
                Participant::new("C").with_rider(rider.clone()),
                Participant::new("A").with_rider(rider.clone()),
                Participant::new("B").with_rider(rider.clone()),
            ],
            riders: vec![rider],
            current_stage: 1,
            roster_id: None,
        };

        recompute_participants(&mut state);
        let names: Vec<&str> = state.participants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_slots_beyond_current_stage_are_ignored() {
        let mut state = state();
        state.current_stage = 1;
        recompute_participants(&mut state);

        let b = state.participant("B").unwrap();
        assert_eq!(b.stage_points[1], 0);
        assert_eq!(b.total_points, 55);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut once = state();
        recompute_participants(&mut once);
        let mut twice = once.clone();
        recompute_participants(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_all_riders_overlay_and_sort() {
        let mut state = state();
        state.participants[0].team[0].status = RiderStatus::Dropped;

        let riders = all_riders(&state);
        let names: Vec<&str> = riders.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "X", "Y"]);

        let z = &riders[0];
        assert!(!z.in_team);
        assert_eq!(z.selected_by, 0);
        assert_eq!(z.total_points, 50);

        let y = &riders[2];
        assert!(y.in_team);
        assert_eq!(y.selected_by, 2);
        assert_eq!(y.status, RiderStatus::Dropped);
    }
}
