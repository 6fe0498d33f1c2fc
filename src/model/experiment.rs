//! Experiment - time-boxed test with traffic-split variants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Parameter, ParameterDataType, Segment};
use crate::{Error, Result};

/// Lifecycle status of an experiment.
///
/// Transitions: draft → schedule → running → finish, draft → cancel,
/// schedule/running → abort. Only schedule/running experiments participate
/// in conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    /// Created but not yet approved.
    Draft,
    /// Approved and waiting for its start date.
    Schedule,
    /// Currently serving traffic.
    Running,
    /// Completed normally.
    Finish,
    /// Rejected before approval.
    Cancel,
    /// Stopped while scheduled or running.
    Abort,
}

impl ExperimentStatus {
    /// Whether experiments in this status participate in conflict
    /// detection.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Schedule | Self::Running)
    }
}

/// Inclusive `[start, end]` time window in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start, unix seconds.
    pub start: i64,
    /// Inclusive end, unix seconds.
    pub end: i64,
}

impl TimeWindow {
    /// Create a window.
    #[must_use]
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Inclusive overlap test: `[10,20]` and `[20,30]` overlap, `[10,19]`
    /// and `[20,30]` do not.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.end >= other.start && other.end >= self.start
    }

    /// Validate that the window is not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `end < start`.
    pub fn validate(self) -> Result<()> {
        if self.end < self.start {
            return Err(Error::Validation(format!(
                "time window end {} precedes start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }
}

/// Parameter override carried by a variant.
///
/// The data type and name are denormalized from the referenced parameter
/// and must match it exactly; the rollout value travels as a string on the
/// wire, with boolean values restricted to the literals "true"/"false".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantParameter {
    /// Referenced parameter id.
    pub parameter_id: u32,
    /// Denormalized parameter data type.
    pub data_type: ParameterDataType,
    /// Denormalized parameter name.
    pub name: String,
    /// Value served by this variant.
    pub rollout_value: String,
}

impl VariantParameter {
    /// Validate this override against the parameter it references.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name or data type disagrees
    /// with the referenced parameter, or the rollout value is empty /
    /// not a boolean literal for the respective data types.
    pub fn validate_against(&self, parameter: &Parameter) -> Result<()> {
        if self.parameter_id != parameter.id {
            return Err(Error::Validation(format!(
                "variant parameter references parameter {} but was checked against {}",
                self.parameter_id, parameter.id
            )));
        }
        if self.name != parameter.name {
            return Err(Error::Validation(format!(
                "parameter {} has invalid name '{}'",
                self.parameter_id, self.name
            )));
        }
        if self.data_type != parameter.data_type {
            return Err(Error::Validation(format!(
                "parameter {} has invalid data type",
                self.parameter_id
            )));
        }
        let valid = match parameter.data_type {
            ParameterDataType::Boolean => {
                self.rollout_value == "true" || self.rollout_value == "false"
            }
            ParameterDataType::String | ParameterDataType::Number => {
                !self.rollout_value.is_empty()
            }
        };
        if valid {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "parameter {} has invalid rollout value '{}'",
                self.parameter_id, self.rollout_value
            )))
        }
    }
}

/// One arm of an experiment with its share of traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Unique identifier.
    pub id: u32,
    /// Variant name.
    pub name: String,
    /// Percentage of bucketed traffic, 0..=100.
    pub traffic_allocation: u32,
    /// Parameter overrides served by this variant.
    pub parameters: Vec<VariantParameter>,
}

/// A time-boxed experiment with traffic-split variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Unique identifier.
    pub id: u32,
    /// Unique experiment name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Inclusive start date, unix seconds.
    pub start_date: i64,
    /// Inclusive end date, unix seconds.
    pub end_date: i64,
    /// Attribute used for bucketing.
    pub hash_attribute_id: u32,
    /// Lifecycle status.
    pub status: ExperimentStatus,
    /// Restricting segment id; `None` targets all users.
    #[serde(default)]
    pub segment_id: Option<u32>,
    /// Hydrated restricting segment, when loaded for conflict analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    /// Experiment arms.
    pub variants: Vec<Variant>,
    /// Creation timestamp, if known.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-update timestamp, if known.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Experiment {
    /// The experiment's time window.
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_date, self.end_date)
    }

    /// Distinct parameter ids referenced across all variants, in first-seen
    /// order.
    #[must_use]
    pub fn parameter_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        for variant in &self.variants {
            for parameter in &variant.parameters {
                if !ids.contains(&parameter.parameter_id) {
                    ids.push(parameter.parameter_id);
                }
            }
        }
        ids
    }

    /// Validate structural invariants: window ordering and variant traffic
    /// allocations summing to exactly 100.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation(
                "experiment name must not be empty".into(),
            ));
        }
        self.window().validate()?;
        if self.variants.is_empty() {
            return Err(Error::Validation(format!(
                "experiment '{}' must have at least one variant",
                self.name
            )));
        }
        let total: u32 = self.variants.iter().map(|v| v.traffic_allocation).sum();
        if total != 100 {
            return Err(Error::Validation(format!(
                "variant traffic allocations of experiment '{}' sum to {total}, expected 100",
                self.name
            )));
        }
        Ok(())
    }

    /// Approve a draft experiment, moving it to schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless the experiment is a draft.
    pub fn approve(&mut self) -> Result<()> {
        self.transition(ExperimentStatus::Draft, ExperimentStatus::Schedule)
    }

    /// Reject a draft experiment, moving it to cancel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless the experiment is a draft.
    pub fn reject(&mut self) -> Result<()> {
        self.transition(ExperimentStatus::Draft, ExperimentStatus::Cancel)
    }

    /// Abort a scheduled or running experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless the experiment is scheduled or
    /// running.
    pub fn abort(&mut self) -> Result<()> {
        if !self.status.is_active() {
            return Err(Error::Validation(format!(
                "experiment '{}' is not in schedule or running status",
                self.name
            )));
        }
        self.status = ExperimentStatus::Abort;
        self.touch();
        Ok(())
    }

    /// Advance schedule → running / running → finish based on the clock.
    ///
    /// Returns `true` if the status changed.
    pub fn refresh_status(&mut self, now: i64) -> bool {
        match self.status {
            ExperimentStatus::Schedule if self.start_date < now => {
                self.status = ExperimentStatus::Running;
                self.touch();
                true
            }
            ExperimentStatus::Running if self.end_date < now => {
                self.status = ExperimentStatus::Finish;
                self.touch();
                true
            }
            _ => false,
        }
    }

    fn transition(&mut self, from: ExperimentStatus, to: ExperimentStatus) -> Result<()> {
        if self.status != from {
            return Err(Error::Validation(format!(
                "experiment '{}' is not in {from:?} status",
                self.name
            )));
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
