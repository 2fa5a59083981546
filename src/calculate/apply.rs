//! Stage result application.
//!
//! Applying a stage is two steps: resolve every referenced name against the
//! rider universe (collecting all failures), then mutate. A payload with any
//! unresolved name never touches the state.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::lookup::{Resolution, RiderIndex};
use crate::models::{slot_for_stage, Jersey, RaceState, Rider, RiderStatus, StageResult};
use crate::validate::{Issue, ValidationErrors, ValidationIssue};

/// A stage payload with every rider name mapped to its universe name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStage {
    pub stage: u32,
    slot: usize,
    placings: Vec<(String, u32)>,
    jerseys: Vec<(Jersey, String)>,
    dropouts: Vec<String>,
}

/// What an application changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySummary {
    pub stage: u32,
    pub placings: usize,
    pub jerseys: usize,
    pub dropouts: usize,

    /// Placement points plus jersey bonuses written into the stage slot
    pub points_awarded: u32,
}

/// Check a payload against the universe without mutating anything.
pub fn resolve_stage(riders: &[Rider], result: &StageResult) -> Result<ResolvedStage, ValidationErrors> {
    let index = RiderIndex::new(riders);
    let mut issues: Vec<Issue> = Vec::new();

    let slot = slot_for_stage(result.stage);
    if slot.is_none() {
        issues.push(ValidationIssue::StageOutOfRange { stage: result.stage }.into());
    }

    let resolve = |name: &str, issues: &mut Vec<Issue>| -> Option<String> {
        match index.resolve(name) {
            Resolution::Exact(found) => Some(found.to_string()),
            Resolution::Normalized(found) => {
                debug!("Matched rider {:?} to {:?} after normalization", name, found);
                Some(found.to_string())
            }
            Resolution::Ambiguous => {
                issues.push(
                    ValidationIssue::AmbiguousRider {
                        rider: name.to_string(),
                    }
                    .into(),
                );
                None
            }
            Resolution::NotFound => {
                issues.push(
                    ValidationIssue::UnknownRider {
                        rider: name.to_string(),
                    }
                    .into(),
                );
                None
            }
        }
    };

    let mut placings = Vec::with_capacity(result.top10.len());
    let mut placed = HashSet::new();
    for placing in &result.top10 {
        if placing.position == 0 {
            issues.push(
                ValidationIssue::InvalidPosition {
                    rider: placing.rider.clone(),
                }
                .into(),
            );
        }
        if let Some(name) = resolve(&placing.rider, &mut issues) {
            if !placed.insert(name.clone()) {
                issues.push(ValidationIssue::DuplicatePlacing { rider: name }.into());
                continue;
            }
            placings.push((name, placing.points.unwrap_or(0)));
        }
    }

    let jerseys = result
        .jerseys
        .iter()
        .filter_map(|(jersey, holder)| {
            resolve(&holder.rider, &mut issues).map(|name| (jersey.clone(), name))
        })
        .collect();

    let dropouts = result
        .dropouts
        .iter()
        .filter_map(|name| resolve(name, &mut issues))
        .collect();

    ValidationErrors::check(issues)?;

    Ok(ResolvedStage {
        stage: result.stage,
        // `check` rejected out-of-range stages above
        slot: slot.unwrap_or_default(),
        placings,
        jerseys,
        dropouts,
    })
}

/// Write a resolved stage into the race state.
///
/// The stage slot is cleared on every rider copy first, so re-applying a
/// corrected payload replaces the old numbers instead of adding to them.
pub fn apply_resolved(state: &mut RaceState, stage: &ResolvedStage) -> ApplySummary {
    let slot = stage.slot;
    state.for_all_riders_mut(|rider| rider.points[slot] = 0);

    let mut summary = ApplySummary {
        stage: stage.stage,
        ..ApplySummary::default()
    };

    for (name, points) in &stage.placings {
        state.for_each_rider_mut(name, |rider| rider.points[slot] = *points);
        summary.placings += 1;
        summary.points_awarded = summary.points_awarded.saturating_add(*points);
    }

    for (jersey, name) in &stage.jerseys {
        let bonus = jersey.bonus();
        state.for_each_rider_mut(name, |rider| {
            rider.points[slot] = rider.points[slot].saturating_add(bonus);
        });
        summary.jerseys += 1;
        summary.points_awarded = summary.points_awarded.saturating_add(bonus);
    }

    for name in &stage.dropouts {
        let mut newly_dropped = false;
        state.for_each_rider_mut(name, |rider| {
            newly_dropped |= rider.status == RiderStatus::Active;
            rider.status = RiderStatus::Dropped;
        });
        if newly_dropped {
            warn!("Rider {} dropped out in stage {}", name, stage.stage);
        }
        summary.dropouts += 1;
    }

    if stage.stage > state.current_stage {
        state.current_stage = stage.stage;
    }

    info!(
        "Applied stage {}: {} placings, {} jerseys, {} dropouts, {} points",
        stage.stage, summary.placings, summary.jerseys, summary.dropouts, summary.points_awarded
    );

    summary
}

/// Resolve and apply one stage, all-or-nothing.
pub fn apply_stage(state: &mut RaceState, result: &StageResult) -> Result<ApplySummary, ValidationErrors> {
    let resolved = resolve_stage(&state.riders, result)?;
    Ok(apply_resolved(state, &resolved))
}
