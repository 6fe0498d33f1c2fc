//! Conflict Detector - segment overlap and experiment conflict analysis
//!
//! Orchestrates the rule model, the constraint compiler, and the solver
//! client to answer two questions:
//!
//! 1. Can these segments match the same user profile simultaneously?
//! 2. Does a candidate experiment conflict with scheduled/running ones?
//!
//! Every error from compilation or the solver boundary aborts the check and
//! propagates; callers must fail closed (block the operation) rather than
//! default to "no conflict".

use std::future::Future;

use tracing::debug;

use crate::compile::{CompileCache, ConstraintCompiler};
use crate::model::{Experiment, Segment, TimeWindow};
use crate::solver::{ModelBinding, SatChecker};
use crate::{Error, Result};

/// Candidate experiment shape submitted for conflict analysis.
#[derive(Debug, Clone)]
pub struct ConflictQuery {
    /// Parameter ids the candidate's variants reference.
    pub parameter_ids: Vec<u32>,
    /// The candidate's restricting segment, hydrated; `None` targets all
    /// users.
    pub segment: Option<Segment>,
    /// The candidate's inclusive time window.
    pub window: TimeWindow,
}

/// Data-access collaborator that loads existing experiments eligible for
/// conflict analysis: status schedule/running, variant parameters
/// intersecting `parameter_ids`, time window overlapping `window`, hydrated
/// with their restricting segment.
pub trait ExperimentCatalog: Send + Sync {
    /// Load candidate conflicting experiments.
    fn active_conflicting(
        &self,
        parameter_ids: &[u32],
        window: TimeWindow,
    ) -> impl Future<Output = Result<Vec<Experiment>>> + Send;
}

/// Result of a segment-overlap check.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapVerdict {
    /// `true` iff the segments are provably disjoint (no overlapping
    /// profile exists).
    pub valid: bool,
    /// Witness profile assignments when an overlap exists.
    pub witness: Vec<ModelBinding>,
}

impl OverlapVerdict {
    const fn disjoint() -> Self {
        Self {
            valid: true,
            witness: Vec::new(),
        }
    }
}

/// Detects targeting-rule conflicts between segments and experiments.
#[derive(Debug)]
pub struct ConflictDetector<S, C> {
    solver: S,
    catalog: C,
    compiler: ConstraintCompiler,
    cache: CompileCache,
}

impl<S: SatChecker, C: ExperimentCatalog> ConflictDetector<S, C> {
    /// Create a detector over a solver client and a catalog.
    #[must_use]
    pub fn new(solver: S, catalog: C) -> Self {
        Self {
            solver,
            catalog,
            compiler: ConstraintCompiler::new(),
            cache: CompileCache::new(),
        }
    }

    /// Check whether the given segments can match one profile
    /// simultaneously.
    ///
    /// An empty list short-circuits to `valid = true` without contacting
    /// the solver.
    ///
    /// # Errors
    ///
    /// Propagates validation, compilation, transport, and protocol errors;
    /// none of them may be read as "no conflict".
    pub async fn check_segments_conflict(&self, segments: &[Segment]) -> Result<OverlapVerdict> {
        if segments.is_empty() {
            return Ok(OverlapVerdict::disjoint());
        }

        let constraint = self.cache.render_cached(&self.compiler, segments)?;
        let outcome = self.solver.check(&constraint).await?;
        debug!(
            segments = segments.len(),
            valid = outcome.no_conflict(),
            "segment overlap check completed"
        );

        Ok(OverlapVerdict {
            valid: outcome.no_conflict(),
            witness: outcome.model,
        })
    }

    /// Find scheduled/running experiments the candidate would conflict
    /// with. An empty result means the candidate may proceed.
    ///
    /// Candidates sharing a parameter and an overlapping time window
    /// conflict unless both sides carry a restricting segment **and** the
    /// solver proves the pair disjoint; a missing segment on either side is
    /// conservatively treated as population overlap.
    ///
    /// # Errors
    ///
    /// Propagates catalog and solver errors; the conflict list is never
    /// silently truncated by a failure.
    pub async fn find_conflicting_experiments(
        &self,
        query: &ConflictQuery,
    ) -> Result<Vec<Experiment>> {
        let candidates = self
            .catalog
            .active_conflicting(&query.parameter_ids, query.window)
            .await?;

        let mut conflicts = Vec::new();
        for existing in candidates {
            // Re-establish the catalog contract; inactive or non-overlapping
            // rows must not reach the solver.
            if !existing.status.is_active() || !existing.window().overlaps(query.window) {
                continue;
            }

            if self.pair_overlaps(query.segment.as_ref(), &existing).await? {
                conflicts.push(existing);
            }
        }

        debug!(conflicts = conflicts.len(), "experiment conflict scan completed");
        Ok(conflicts)
    }

    /// Verify that a candidate experiment can be scheduled, turning a
    /// non-empty conflict list into a descriptive error naming each
    /// conflicting experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentConflict`] when conflicts exist, or any
    /// error from [`Self::find_conflicting_experiments`].
    pub async fn ensure_schedulable(&self, query: &ConflictQuery) -> Result<()> {
        let conflicts = self.find_conflicting_experiments(query).await?;
        if conflicts.is_empty() {
            return Ok(());
        }
        Err(Error::ExperimentConflict(describe_conflicts(&conflicts)))
    }

    async fn pair_overlaps(
        &self,
        candidate_segment: Option<&Segment>,
        existing: &Experiment,
    ) -> Result<bool> {
        let (Some(candidate), Some(existing_segment)) = (candidate_segment, &existing.segment)
        else {
            // Either side targeting all users cannot be proven disjoint.
            return Ok(true);
        };

        if candidate.id == existing_segment.id {
            return Ok(true);
        }

        let verdict = self
            .check_segments_conflict(&[candidate.clone(), existing_segment.clone()])
            .await?;
        Ok(!verdict.valid)
    }
}

fn describe_conflicts(conflicts: &[Experiment]) -> String {
    let details: Vec<String> = conflicts
        .iter()
        .map(|exp| {
            format!(
                "experiment '{}' (id {}, status {:?}, window {}..={})",
                exp.name, exp.id, exp.status, exp.start_date, exp.end_date
            )
        })
        .collect();
    details.join(", ")
}
