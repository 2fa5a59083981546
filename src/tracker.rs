//! Race tracker: owns the race state and keeps derived views consistent.
//!
//! Every write (roster load, stage application, reset, restore) runs the full
//! recompute before returning, so readers never observe stale totals.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::calculate::{self, ApplySummary, DerivedViews};
use crate::config::ScoringConfig;
use crate::models::{
    ExportSnapshot, Participant, ParticipantProgression, RaceState, RankingHistory,
    RiderStatus, RiderSummary, RosterPayload, StageRanking, StageRankingEntry, StageResult,
    FINAL_CLASSIFICATION, STAGE_SLOTS,
};
use crate::validate::{validate_roster, Inconsistency, RosterRules, ValidationErrors, ValidationIssue};

/// Race state plus everything derived from it.
#[derive(Debug, Clone)]
pub struct Tracker {
    state: RaceState,
    views: DerivedViews,
    scoring: ScoringConfig,
}

impl Tracker {
    /// An empty race with no participants.
    pub fn new(scoring: ScoringConfig) -> Self {
        Self {
            state: RaceState::default(),
            views: DerivedViews::default(),
            scoring,
        }
    }

    /// Start a race from a drafted roster.
    pub fn from_roster(
        roster: &RosterPayload,
        scoring: ScoringConfig,
        rules: RosterRules,
    ) -> Result<Self, ValidationErrors> {
        validate_roster(roster, &rules)?;

        let mut tracker = Self::new(scoring);
        tracker.state = RaceState::from_roster(roster);
        tracker.recompute();

        info!(
            "Loaded roster: {} participants, {} riders",
            tracker.state.participants.len(),
            tracker.state.riders.len()
        );
        Ok(tracker)
    }

    /// Restore a race from a snapshot.
    pub fn from_snapshot(
        snapshot: &ExportSnapshot,
        scoring: ScoringConfig,
    ) -> Result<Self, ValidationErrors> {
        if snapshot.current_stage > FINAL_CLASSIFICATION {
            return Err(ValidationErrors::single(ValidationIssue::StageOutOfRange {
                stage: snapshot.current_stage,
            }));
        }

        let mut tracker = Self::new(scoring);
        tracker.state = snapshot.to_state();
        tracker.state.sync_teams_from_universe();
        tracker.recompute();

        info!(
            "Restored snapshot from {} at stage {}",
            snapshot.export_date, snapshot.current_stage
        );
        Ok(tracker)
    }

    /// Start from a roster and replay stages in order.
    pub fn replay(
        roster: &RosterPayload,
        stages: &[StageResult],
        scoring: ScoringConfig,
        rules: RosterRules,
    ) -> Result<Self, ValidationErrors> {
        let mut tracker = Self::from_roster(roster, scoring, rules)?;
        tracker.apply_stages(stages)?;
        Ok(tracker)
    }

    fn recompute(&mut self) {
        self.views = calculate::recompute(&mut self.state);
    }

    /// Apply one stage, filling missing placing points from the scoring table.
    ///
    /// Nothing changes if any referenced name fails to resolve.
    pub fn apply_stage(&mut self, result: &StageResult) -> Result<ApplySummary, ValidationErrors> {
        let scored = self.scoring.scored(result);
        for (given, placing) in result.top10.iter().zip(&scored.top10) {
            if self.scoring.is_override(result.stage, given) {
                info!(
                    "Stage {} position {}: {} points for {} override the table ({})",
                    result.stage,
                    placing.position,
                    placing.points.unwrap_or_default(),
                    placing.rider,
                    self.scoring.points_for(result.stage, placing.position)
                );
            }
        }
        let summary = calculate::apply_stage(&mut self.state, &scored)?;
        self.recompute();
        Ok(summary)
    }

    /// Apply several stages in order. If any payload is invalid, none is applied
    /// and the issues of every payload are reported together.
    pub fn apply_stages(&mut self, results: &[StageResult]) -> Result<Vec<ApplySummary>, ValidationErrors> {
        let mut resolved = Vec::with_capacity(results.len());
        let mut issues = Vec::new();
        for result in results {
            match calculate::resolve_stage(&self.state.riders, &self.scoring.scored(result)) {
                Ok(stage) => resolved.push(stage),
                Err(errors) => issues.extend(errors.issues().iter().cloned()),
            }
        }
        ValidationErrors::check(issues)?;

        let summaries = resolved
            .iter()
            .map(|stage| calculate::apply_resolved(&mut self.state, stage))
            .collect();
        self.recompute();
        Ok(summaries)
    }

    /// Mark results as loaded up to `stage` without applying any payload.
    ///
    /// The current stage only moves forward.
    pub fn set_current_stage(&mut self, stage: u32) -> Result<(), ValidationErrors> {
        if stage > FINAL_CLASSIFICATION {
            return Err(ValidationErrors::single(ValidationIssue::StageOutOfRange { stage }));
        }
        if stage < self.state.current_stage {
            return Err(ValidationErrors::single(Inconsistency::StageRegression {
                current: self.state.current_stage,
                requested: stage,
            }));
        }

        self.state.current_stage = stage;
        self.recompute();
        Ok(())
    }

    /// Clear all results: every point slot, every dropout, the stage counter.
    pub fn reset(&mut self) {
        self.state.for_all_riders_mut(|rider| {
            rider.points = [0; STAGE_SLOTS];
            rider.status = RiderStatus::Active;
        });
        self.state.current_stage = 0;
        self.recompute();
        info!("Reset race results");
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn current_stage(&self) -> u32 {
        self.state.current_stage
    }

    /// Participants, best total first.
    pub fn participants(&self) -> &[Participant] {
        &self.state.participants
    }

    pub fn all_riders(&self) -> &[RiderSummary] {
        &self.views.all_riders
    }

    pub fn ranking_history(&self) -> &RankingHistory {
        &self.views.ranking_history
    }

    pub fn ranking_progression(&self) -> &[ParticipantProgression] {
        &self.views.ranking_progression
    }

    /// Standings after the last completed stage.
    pub fn current_ranking(&self) -> Option<&StageRanking> {
        self.views.ranking_history.last()
    }

    /// Participants ranked 1-3 on a single stage. None if the stage is not loaded.
    pub fn stage_podium(&self, stage: u32) -> Option<Vec<StageRankingEntry>> {
        let ranking = calculate::stage_ranking(&self.state, stage)?;
        Some(
            ranking
                .entries
                .into_iter()
                .filter(|e| e.rank <= 3 && e.stage_points > 0)
                .collect(),
        )
    }

    /// Names of the participants who won a stage.
    pub fn stage_winners(&self, stage: u32) -> Vec<&str> {
        calculate::stage_winners(&self.state, stage)
    }

    /// Export the current state.
    pub fn snapshot(&self, at: DateTime<Utc>) -> ExportSnapshot {
        ExportSnapshot {
            participants: self.state.participants.clone(),
            all_riders: self.views.all_riders.clone(),
            current_stage: self.state.current_stage,
            export_date: at,
            roster_id: self.state.roster_id.clone(),
        }
    }
}
