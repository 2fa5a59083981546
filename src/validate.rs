//! Input validation.
//!
//! Every check collects all of its findings instead of stopping at the first,
//! so one correction pass can fix a whole roster or stage file. Nothing here
//! mutates race state.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::RosterPayload;

/// A single problem found in a roster or stage payload.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("stage {stage} is out of range (1-22)")]
    StageOutOfRange { stage: u32 },

    #[error("unknown rider: {rider}")]
    UnknownRider { rider: String },

    #[error("rider name {rider} matches more than one rider")]
    AmbiguousRider { rider: String },

    #[error("rider {rider} appears more than once in the placings")]
    DuplicatePlacing { rider: String },

    #[error("placing for {rider} has position 0")]
    InvalidPosition { rider: String },

    #[error("participant name is empty")]
    EmptyParticipantName,

    #[error("participant {participant} is listed more than once")]
    DuplicateParticipant { participant: String },

    #[error("empty rider name in {context}")]
    EmptyRiderName { context: String },

    #[error("rider {rider} is listed more than once in the rider list")]
    DuplicateRider { rider: String },

    #[error("{participant} picked {rider}, who is not in the rider list")]
    PickNotInUniverse { participant: String, rider: String },
}

/// Conflicting data: the operation is rejected and state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    #[error("{participant} has {count} riders (maximum {max})")]
    TeamTooLarge {
        participant: String,
        count: usize,
        max: usize,
    },

    #[error("{participant} picked {rider} more than once")]
    DuplicatePick { participant: String, rider: String },

    #[error("{rider} is picked by more than one participant: {}", .participants.join(", "))]
    SharedRider {
        rider: String,
        participants: Vec<String>,
    },

    #[error("cannot move current stage back from {current} to {requested}")]
    StageRegression { current: u32, requested: u32 },
}

/// Any issue a check can report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(untagged)]
pub enum Issue {
    #[error(transparent)]
    Validation(#[from] ValidationIssue),

    #[error(transparent)]
    Inconsistency(#[from] Inconsistency),
}

/// Every issue found by one check. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Issue>);

impl ValidationErrors {
    /// `Ok` when `issues` is empty, otherwise the full list.
    pub fn check(issues: Vec<Issue>) -> Result<(), ValidationErrors> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self(issues))
        }
    }

    pub fn single(issue: impl Into<Issue>) -> Self {
        Self(vec![issue.into()])
    }

    pub fn issues(&self) -> &[Issue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable lines, one per issue.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} issue(s): {}", self.0.len(), self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Team composition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterRules {
    pub max_team_size: usize,

    /// Reject rosters where two participants picked the same rider
    pub exclusive_riders: bool,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            max_team_size: crate::models::MAX_TEAM_SIZE,
            exclusive_riders: false,
        }
    }
}

/// Check a roster payload before building race state from it.
pub fn validate_roster(roster: &RosterPayload, rules: &RosterRules) -> Result<(), ValidationErrors> {
    let mut issues: Vec<Issue> = Vec::new();

    let universe = roster.universe();
    let mut universe_names = HashSet::with_capacity(universe.len());
    for rider in &universe {
        if rider.name.trim().is_empty() {
            issues.push(
                ValidationIssue::EmptyRiderName {
                    context: "rider list".to_string(),
                }
                .into(),
            );
        } else if !universe_names.insert(rider.name.as_str()) {
            issues.push(
                ValidationIssue::DuplicateRider {
                    rider: rider.name.clone(),
                }
                .into(),
            );
        }
    }

    let mut participant_names = HashSet::new();
    let mut picked_by: HashMap<&str, Vec<String>> = HashMap::new();

    for entry in &roster.participants {
        if entry.name.trim().is_empty() {
            issues.push(ValidationIssue::EmptyParticipantName.into());
        } else if !participant_names.insert(entry.name.as_str()) {
            issues.push(
                ValidationIssue::DuplicateParticipant {
                    participant: entry.name.clone(),
                }
                .into(),
            );
        }

        if entry.riders.len() > rules.max_team_size {
            issues.push(
                Inconsistency::TeamTooLarge {
                    participant: entry.name.clone(),
                    count: entry.riders.len(),
                    max: rules.max_team_size,
                }
                .into(),
            );
        }

        let mut team_names = HashSet::new();
        for pick in &entry.riders {
            if pick.name.trim().is_empty() {
                issues.push(
                    ValidationIssue::EmptyRiderName {
                        context: format!("team of {}", entry.name),
                    }
                    .into(),
                );
                continue;
            }
            if !team_names.insert(pick.name.as_str()) {
                issues.push(
                    Inconsistency::DuplicatePick {
                        participant: entry.name.clone(),
                        rider: pick.name.clone(),
                    }
                    .into(),
                );
                continue;
            }
            if !universe_names.contains(pick.name.as_str()) {
                issues.push(
                    ValidationIssue::PickNotInUniverse {
                        participant: entry.name.clone(),
                        rider: pick.name.clone(),
                    }
                    .into(),
                );
            }
            picked_by
                .entry(pick.name.as_str())
                .or_default()
                .push(entry.name.clone());
        }
    }

    if rules.exclusive_riders {
        // Report in draft order so the output is stable.
        let mut reported = HashSet::new();
        for pick in roster.participants.iter().flat_map(|p| p.riders.iter()) {
            if let Some(participants) = picked_by.get(pick.name.as_str()) {
                if participants.len() > 1 && reported.insert(pick.name.as_str()) {
                    issues.push(
                        Inconsistency::SharedRider {
                            rider: pick.name.clone(),
                            participants: participants.clone(),
                        }
                        .into(),
                    );
                }
            }
        }
    }

    ValidationErrors::check(issues)
}
