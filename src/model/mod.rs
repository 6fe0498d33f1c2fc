//! Rule Model - typed audience attributes, segments, parameters, experiments
//!
//! ## Schema Overview
//!
//! ```text
//! Segment (1) ──< SegmentRule (N, OR-combined)
//!                      │
//!                      └──< Condition (N, AND-combined) ──> Attribute
//!
//! Parameter (1) ──< ParameterRule (N)   [segment-type | attribute-type]
//!
//! Experiment (1) ──< Variant (N) ──< VariantParameter (N) ──> Parameter
//! ```
//!
//! Entities are referenced by id and only embedded by value when fully
//! hydrated for compilation. Validation of structural invariants (enum
//! options, rule shapes, rollout value typing, traffic allocation) lives
//! on the types themselves and runs at construction/update time.

mod attribute;
mod experiment;
mod parameter;
mod segment;

pub use attribute::{Attribute, DataType};
pub use experiment::{
    Experiment, ExperimentStatus, TimeWindow, Variant, VariantParameter,
};
pub use parameter::{
    MatchPolarity, Parameter, ParameterDataType, ParameterRule, ParameterRuleKind, RolloutValue,
};
pub use segment::{Condition, Operator, Segment, SegmentRule};
