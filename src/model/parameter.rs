//! Parameter - named flag value with targeting rules that can override it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Condition;
use crate::{Error, Result};

/// Data type of a parameter (flag) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterDataType {
    /// True/false flag.
    Boolean,
    /// String-valued flag.
    String,
    /// Numeric flag.
    Number,
}

/// Polarity of a segment-type parameter rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolarity {
    /// Rule applies to profiles inside the segment.
    Match,
    /// Rule applies to profiles outside the segment.
    NotMatch,
}

/// Value served for a parameter or variant, typed per the owning entity's
/// declared data type.
///
/// The variant is resolved against [`ParameterDataType`] at the system
/// boundary; it is never inferred from the literal's textual shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RolloutValue {
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// String value.
    String(String),
}

impl RolloutValue {
    /// Whether the runtime type agrees with the declared parameter type.
    #[must_use]
    pub const fn matches_type(&self, data_type: ParameterDataType) -> bool {
        matches!(
            (self, data_type),
            (Self::Bool(_), ParameterDataType::Boolean)
                | (Self::Number(_), ParameterDataType::Number)
                | (Self::String(_), ParameterDataType::String)
        )
    }

    /// Enforce type agreement with the declared parameter type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on a mismatch.
    pub fn expect_type(&self, data_type: ParameterDataType) -> Result<()> {
        if self.matches_type(data_type) {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "rollout value {self:?} does not match declared data type {data_type:?}"
            )))
        }
    }
}

/// The two shapes a parameter rule can take.
///
/// Encoding the shapes as enum variants makes the pairing structural: a
/// segment-type rule cannot exist without its segment id and polarity, and
/// an attribute-type rule owns its condition list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterRuleKind {
    /// Targets profiles by membership in an existing segment.
    Segment {
        /// Referenced segment id.
        segment_id: u32,
        /// Match or not-match the segment.
        match_type: MatchPolarity,
    },
    /// Targets profiles by an inline condition list.
    Attribute {
        /// AND-combined conditions; must be non-empty.
        conditions: Vec<Condition>,
    },
}

/// One targeting rule of a parameter, carrying the value to serve when the
/// rule matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRule {
    /// Unique identifier.
    pub id: u32,
    /// Rule name.
    pub name: String,
    /// Segment-type or attribute-type targeting.
    #[serde(flatten)]
    pub kind: ParameterRuleKind,
    /// Value served when the rule matches.
    pub rollout_value: RolloutValue,
}

impl ParameterRule {
    /// Validate the rule against the owning parameter's declared data type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if an attribute-type rule has no
    /// conditions or the rollout value's runtime type disagrees with
    /// `data_type`.
    pub fn validate(&self, data_type: ParameterDataType) -> Result<()> {
        if let ParameterRuleKind::Attribute { conditions } = &self.kind {
            if conditions.is_empty() {
                return Err(Error::Validation(format!(
                    "attribute-type rule '{}' must have at least one condition",
                    self.name
                )));
            }
        }
        self.rollout_value.expect_type(data_type)
    }
}

/// A named configuration/flag value with a default and an ordered list of
/// targeting rules that can override it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique identifier.
    pub id: u32,
    /// Unique parameter name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Declared value type.
    pub data_type: ParameterDataType,
    /// Value served when no rule matches.
    pub default_rollout_value: RolloutValue,
    /// Number of experiments referencing this parameter.
    #[serde(default)]
    pub usage_count: i64,
    /// Ordered targeting rules.
    #[serde(default)]
    pub rules: Vec<ParameterRule>,
    /// Creation timestamp, if known.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-update timestamp, if known.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Parameter {
    /// Validate the parameter, its default value, and all rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("parameter name must not be empty".into()));
        }
        self.default_rollout_value.expect_type(self.data_type)?;
        for rule in &self.rules {
            rule.validate(self.data_type)?;
        }
        Ok(())
    }
}
