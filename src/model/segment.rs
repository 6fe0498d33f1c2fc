//! Segment - reusable audience filter (OR of rules, each an AND of conditions)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Attribute;
use crate::{Error, Result};

/// Operator of a targeting condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Attribute equals the value.
    Equals,
    /// Attribute differs from the value.
    NotEquals,
    /// String attribute contains the value as a substring.
    Contains,
    /// String attribute does not contain the value.
    NotContains,
    /// Numeric attribute is strictly greater than the value.
    GreaterThan,
    /// Numeric attribute is strictly less than the value.
    LessThan,
    /// Numeric attribute is greater than or equal to the value.
    GreaterThanOrEqual,
    /// Numeric attribute is less than or equal to the value.
    LessThanOrEqual,
    /// Attribute equals one of a comma-separated list of values.
    In,
    /// Attribute equals none of a comma-separated list of values.
    NotIn,
}

/// A single typed condition over an attribute.
///
/// Conditions reference their attribute by id; the `attribute` field is
/// populated when the owning segment is hydrated for compilation. The value
/// is carried as a free-form string and resolved against the attribute's
/// declared data type at compile time, never inferred from its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    /// Referenced attribute id.
    pub attribute_id: u32,
    /// Condition operator.
    pub operator: Operator,
    /// Free-form value; comma-separated list for `in`/`not_in`.
    pub value: String,
    /// Resolved attribute, present on hydrated segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Attribute>,
}

impl Condition {
    /// Create a hydrated condition.
    #[must_use]
    pub fn new(attribute: Attribute, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            attribute_id: attribute.id,
            operator,
            value: value.into(),
            attribute: Some(attribute),
        }
    }

    /// The resolved attribute of a hydrated condition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the condition was not hydrated.
    pub fn resolved_attribute(&self) -> Result<&Attribute> {
        self.attribute.as_ref().ok_or_else(|| {
            Error::Validation(format!(
                "condition references attribute {} but is not hydrated",
                self.attribute_id
            ))
        })
    }
}

/// One rule of a segment: a profile matches iff it satisfies all conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentRule {
    /// Unique identifier.
    pub id: u32,
    /// Rule name.
    pub name: String,
    /// AND-combined conditions; must be non-empty.
    pub conditions: Vec<Condition>,
}

/// Named, reusable audience filter. A profile is in the segment iff it
/// matches any rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Unique identifier.
    pub id: u32,
    /// Unique segment name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// OR-combined rules; must be non-empty.
    pub rules: Vec<SegmentRule>,
    /// Creation timestamp, if known.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-update timestamp, if known.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Segment {
    /// Create a segment from its rules.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, rules: Vec<SegmentRule>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            rules,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    /// Validate structural invariants.
    ///
    /// An empty segment or an empty rule would compile to a vacuous
    /// constraint, so both are rejected here rather than silently weakening
    /// conflict detection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the segment has no rules, any rule
    /// has no conditions, or any hydrated attribute fails its own
    /// validation.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("segment name must not be empty".into()));
        }
        if self.rules.is_empty() {
            return Err(Error::Validation(format!(
                "segment '{}' must have at least one rule",
                self.name
            )));
        }
        for rule in &self.rules {
            if rule.conditions.is_empty() {
                return Err(Error::Validation(format!(
                    "rule '{}' of segment '{}' must have at least one condition",
                    rule.name, self.name
                )));
            }
            for condition in &rule.conditions {
                if let Some(attribute) = &condition.attribute {
                    attribute.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Whether every condition carries its resolved attribute.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.rules
            .iter()
            .flat_map(|rule| rule.conditions.iter())
            .all(|condition| condition.attribute.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;

    fn condition(name: &str, operator: Operator, value: &str) -> Condition {
        Condition::new(Attribute::new(1, name, DataType::String), operator, value)
    }

    #[test]
    fn test_operator_wire_names() {
        let json = serde_json::to_string(&Operator::GreaterThanOrEqual).unwrap();
        assert_eq!(json, "\"greater_than_or_equal\"");
        assert!(serde_json::from_str::<Operator>("\"matches_regex\"").is_err());
    }

    #[test]
    fn test_empty_segment_rejected() {
        let segment = Segment::new(1, "everyone", vec![]);
        assert!(segment.validate().is_err());
    }

    #[test]
    fn test_empty_rule_rejected() {
        let segment = Segment::new(
            1,
            "vn",
            vec![SegmentRule {
                id: 1,
                name: "r1".into(),
                conditions: vec![],
            }],
        );
        assert!(segment.validate().is_err());
    }

    #[test]
    fn test_hydration_detection() {
        let mut segment = Segment::new(
            1,
            "vn",
            vec![SegmentRule {
                id: 1,
                name: "r1".into(),
                conditions: vec![condition("country", Operator::Equals, "VN")],
            }],
        );
        assert!(segment.is_hydrated());

        segment.rules[0].conditions[0].attribute = None;
        assert!(!segment.is_hydrated());
        assert!(segment.rules[0].conditions[0].resolved_attribute().is_err());
    }
}
