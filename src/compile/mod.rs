//! Constraint compilation: hydrated segments → symbolic assertion document
//!
//! The compiler binds every distinct attribute **name** across all input
//! segments to one symbolic variable, so a multi-segment document asks the
//! solver "does one profile exist that satisfies every segment at once",
//! not a set of independent questions.
//!
//! Boolean shape of the combined assertion:
//!
//! ```text
//! (assert (and                 ; over input segments
//!     (or                      ; over each segment's rules
//!         (and <condition>*))  ; over each rule's conditions
//!     ...))
//! ```
//!
//! Compilation fails closed: an operator with no encoding for the
//! attribute's declared data type, or a value that does not parse as the
//! required literal, aborts with [`Error::Compilation`] instead of emitting
//! a silently weakened clause.

mod cache;
mod expr;

pub use cache::CompileCache;
pub use expr::{BoolExpr, CompareOp, Literal, Sort};

use std::fmt::Write;

use rustc_hash::FxHashMap;

use crate::model::{Attribute, Condition, DataType, Operator, Segment};
use crate::{Error, Result};

/// A compiled constraint: declarations plus one combined assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDocument {
    declarations: Vec<(String, Sort)>,
    assertion: BoolExpr,
}

impl ConstraintDocument {
    /// Declared symbols in declaration order (one per distinct attribute
    /// name, first-seen order).
    #[must_use]
    pub fn declarations(&self) -> &[(String, Sort)] {
        &self.declarations
    }

    /// The combined assertion.
    #[must_use]
    pub const fn assertion(&self) -> &BoolExpr {
        &self.assertion
    }

    /// Render the flat textual document: one `declare-const` line per
    /// symbol, then a single `assert` block.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, sort) in &self.declarations {
            let _ = writeln!(out, "(declare-const {name} {})", sort.as_str());
        }
        out.push_str("(assert ");
        self.assertion.render(&mut out);
        out.push_str(")\n");
        out
    }
}

/// Compiles hydrated segments into a [`ConstraintDocument`].
///
/// Stateless; a single instance can serve concurrent calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstraintCompiler {
    _private: (),
}

impl ConstraintCompiler {
    /// Create a compiler.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Compile an ordered, non-empty list of hydrated segments.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the list is empty, a segment fails
    ///   [`Segment::validate`], or a condition is not hydrated.
    /// - [`Error::Compilation`] if two segments bind the same attribute
    ///   name to different sorts, or a condition has no encoding for its
    ///   attribute's data type.
    pub fn compile(&self, segments: &[Segment]) -> Result<ConstraintDocument> {
        if segments.is_empty() {
            return Err(Error::Validation(
                "cannot compile an empty segment list".into(),
            ));
        }

        let mut symbols = SymbolTable::default();
        for segment in segments {
            segment.validate()?;
            for rule in &segment.rules {
                for condition in &rule.conditions {
                    symbols.bind(condition.resolved_attribute()?)?;
                }
            }
        }

        let mut segment_terms = Vec::with_capacity(segments.len());
        for segment in segments {
            let mut rule_terms = Vec::with_capacity(segment.rules.len());
            for rule in &segment.rules {
                let conditions = rule
                    .conditions
                    .iter()
                    .map(encode_condition)
                    .collect::<Result<Vec<_>>>()?;
                rule_terms.push(BoolExpr::And(conditions));
            }
            segment_terms.push(BoolExpr::Or(rule_terms));
        }

        Ok(ConstraintDocument {
            declarations: symbols.into_declarations(),
            assertion: BoolExpr::And(segment_terms),
        })
    }
}

/// Symbol table deduplicated by attribute name, preserving first-seen order
/// so declarations precede use deterministically.
#[derive(Debug, Default)]
struct SymbolTable {
    order: Vec<(String, Sort)>,
    by_name: FxHashMap<String, Sort>,
}

impl SymbolTable {
    fn bind(&mut self, attribute: &Attribute) -> Result<()> {
        let sort = Sort::for_data_type(attribute.data_type);
        if let Some(&bound) = self.by_name.get(&attribute.name) {
            if bound != sort {
                return Err(Error::Compilation(format!(
                    "attribute '{}' is referenced with conflicting sorts {bound:?} and {sort:?}",
                    attribute.name
                )));
            }
            return Ok(());
        }
        self.by_name.insert(attribute.name.clone(), sort);
        self.order.push((attribute.name.clone(), sort));
        Ok(())
    }

    fn into_declarations(self) -> Vec<(String, Sort)> {
        self.order
    }
}

fn encode_condition(condition: &Condition) -> Result<BoolExpr> {
    let attribute = condition.resolved_attribute()?;
    let name = &attribute.name;
    let value = condition.value.as_str();

    match condition.operator {
        Operator::Equals => Ok(BoolExpr::equals(
            name.clone(),
            parse_literal(attribute, value)?,
        )),
        Operator::NotEquals => Ok(BoolExpr::not(BoolExpr::equals(
            name.clone(),
            parse_literal(attribute, value)?,
        ))),
        Operator::GreaterThan => ordering(attribute, CompareOp::Gt, value),
        Operator::LessThan => ordering(attribute, CompareOp::Lt, value),
        Operator::GreaterThanOrEqual => ordering(attribute, CompareOp::Ge, value),
        Operator::LessThanOrEqual => ordering(attribute, CompareOp::Le, value),
        Operator::Contains => contains(attribute, value),
        Operator::NotContains => contains(attribute, value).map(BoolExpr::not),
        Operator::In => {
            let equalities = list_equalities(attribute, value)?;
            Ok(collapse(equalities, BoolExpr::Or))
        }
        Operator::NotIn => {
            let negations: Vec<_> = list_equalities(attribute, value)?
                .into_iter()
                .map(BoolExpr::not)
                .collect();
            Ok(collapse(negations, BoolExpr::And))
        }
    }
}

/// Single-element `in`/`not_in` lists compile to the bare (negated)
/// equality without an `or`/`and` wrapper.
fn collapse(mut terms: Vec<BoolExpr>, combine: fn(Vec<BoolExpr>) -> BoolExpr) -> BoolExpr {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        combine(terms)
    }
}

fn ordering(attribute: &Attribute, op: CompareOp, value: &str) -> Result<BoolExpr> {
    if attribute.data_type != DataType::Number {
        return Err(Error::Compilation(format!(
            "ordering comparison on non-numeric attribute '{}'",
            attribute.name
        )));
    }
    Ok(BoolExpr::Compare {
        op,
        attr: attribute.name.clone(),
        value: parse_literal(attribute, value)?,
    })
}

fn contains(attribute: &Attribute, value: &str) -> Result<BoolExpr> {
    match attribute.data_type {
        DataType::String | DataType::Enum => Ok(BoolExpr::Contains {
            attr: attribute.name.clone(),
            value: value.to_owned(),
        }),
        DataType::Number | DataType::Boolean => Err(Error::Compilation(format!(
            "substring test on non-string attribute '{}'",
            attribute.name
        ))),
    }
}

/// Split an `in`/`not_in` value on commas, trim each element, and encode
/// one equality per element.
fn list_equalities(attribute: &Attribute, value: &str) -> Result<Vec<BoolExpr>> {
    value
        .split(',')
        .map(str::trim)
        .map(|element| {
            Ok(BoolExpr::equals(
                attribute.name.clone(),
                parse_literal(attribute, element)?,
            ))
        })
        .collect()
}

/// Resolve a free-form condition value against the attribute's declared
/// data type. The type is never inferred from the literal's shape.
fn parse_literal(attribute: &Attribute, value: &str) -> Result<Literal> {
    match attribute.data_type {
        DataType::String | DataType::Enum => Ok(Literal::Str(value.to_owned())),
        DataType::Number => value.trim().parse::<i64>().map(Literal::Int).map_err(|_| {
            Error::Compilation(format!(
                "value '{value}' of numeric attribute '{}' is not an integer",
                attribute.name
            ))
        }),
        DataType::Boolean => match value.trim() {
            "true" => Ok(Literal::Bool(true)),
            "false" => Ok(Literal::Bool(false)),
            other => Err(Error::Compilation(format!(
                "value '{other}' of boolean attribute '{}' must be 'true' or 'false'",
                attribute.name
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SegmentRule;

    fn attribute(name: &str, data_type: DataType) -> Attribute {
        Attribute::new(1, name, data_type)
    }

    fn segment(name: &str, conditions: Vec<Condition>) -> Segment {
        Segment::new(
            1,
            name,
            vec![SegmentRule {
                id: 1,
                name: format!("{name}-rule"),
                conditions,
            }],
        )
    }

    fn encode(data_type: DataType, operator: Operator, value: &str) -> Result<String> {
        let condition = Condition::new(attribute("x", data_type), operator, value);
        encode_condition(&condition).map(|expr| {
            let mut out = String::new();
            expr.render(&mut out);
            out
        })
    }

    #[test]
    fn test_equals_quoting_by_type() {
        assert_eq!(
            encode(DataType::String, Operator::Equals, "VN").unwrap(),
            "(= x \"VN\")"
        );
        assert_eq!(
            encode(DataType::Number, Operator::Equals, "18").unwrap(),
            "(= x 18)"
        );
        assert_eq!(
            encode(DataType::Enum, Operator::Equals, "pro").unwrap(),
            "(= x \"pro\")"
        );
        assert_eq!(
            encode(DataType::Boolean, Operator::Equals, "true").unwrap(),
            "(= x true)"
        );
    }

    #[test]
    fn test_not_equals() {
        assert_eq!(
            encode(DataType::String, Operator::NotEquals, "US").unwrap(),
            "(not (= x \"US\"))"
        );
    }

    #[test]
    fn test_in_splits_and_trims() {
        assert_eq!(
            encode(DataType::String, Operator::In, "A, B,C").unwrap(),
            "(or (= x \"A\") (= x \"B\") (= x \"C\"))"
        );
    }

    #[test]
    fn test_single_element_in_collapses() {
        assert_eq!(
            encode(DataType::String, Operator::In, "A").unwrap(),
            "(= x \"A\")"
        );
        assert_eq!(
            encode(DataType::String, Operator::NotIn, "A").unwrap(),
            "(not (= x \"A\"))"
        );
    }

    #[test]
    fn test_not_in_mirrors_in() {
        assert_eq!(
            encode(DataType::Number, Operator::NotIn, "1, 2").unwrap(),
            "(and (not (= x 1)) (not (= x 2)))"
        );
    }

    #[test]
    fn test_contains_string_only() {
        assert_eq!(
            encode(DataType::String, Operator::Contains, "@corp").unwrap(),
            "(str.contains x \"@corp\")"
        );
        assert_eq!(
            encode(DataType::String, Operator::NotContains, "@corp").unwrap(),
            "(not (str.contains x \"@corp\"))"
        );
        assert!(encode(DataType::Number, Operator::Contains, "1").is_err());
    }

    #[test]
    fn test_ordering_rejected_on_strings() {
        assert!(encode(DataType::String, Operator::GreaterThan, "z").is_err());
        assert_eq!(
            encode(DataType::Number, Operator::LessThanOrEqual, "30").unwrap(),
            "(<= x 30)"
        );
    }

    #[test]
    fn test_bad_literals_fail_closed() {
        assert!(encode(DataType::Number, Operator::Equals, "eighteen").is_err());
        assert!(encode(DataType::Boolean, Operator::Equals, "yes").is_err());
        assert!(encode(DataType::Number, Operator::In, "1, two").is_err());
    }

    #[test]
    fn test_symbol_table_dedup_by_name() {
        let country = attribute("country", DataType::String);
        let age = Attribute::new(2, "age", DataType::Number);

        let a = segment(
            "a",
            vec![
                Condition::new(country.clone(), Operator::Equals, "VN"),
                Condition::new(age.clone(), Operator::GreaterThanOrEqual, "18"),
            ],
        );
        let b = segment(
            "b",
            vec![Condition::new(country, Operator::Equals, "US")],
        );

        let doc = ConstraintCompiler::new().compile(&[a, b]).unwrap();
        let names: Vec<_> = doc.declarations().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["country", "age"]);
    }

    #[test]
    fn test_conflicting_sorts_rejected() {
        let a = segment(
            "a",
            vec![Condition::new(
                attribute("flag", DataType::String),
                Operator::Equals,
                "on",
            )],
        );
        let b = segment(
            "b",
            vec![Condition::new(
                attribute("flag", DataType::Boolean),
                Operator::Equals,
                "true",
            )],
        );
        assert!(ConstraintCompiler::new().compile(&[a, b]).is_err());
    }

    #[test]
    fn test_document_shape() {
        let doc = ConstraintCompiler::new()
            .compile(&[segment(
                "vn-adults",
                vec![
                    Condition::new(
                        attribute("country", DataType::String),
                        Operator::Equals,
                        "VN",
                    ),
                    Condition::new(
                        Attribute::new(2, "age", DataType::Number),
                        Operator::GreaterThanOrEqual,
                        "18",
                    ),
                ],
            )])
            .unwrap();

        assert_eq!(
            doc.render(),
            "(declare-const country String)\n\
             (declare-const age Int)\n\
             (assert (and (or (and (= country \"VN\") (>= age 18)))))\n"
        );
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(ConstraintCompiler::new().compile(&[]).is_err());
    }

    #[test]
    fn test_unhydrated_segment_rejected() {
        let mut seg = segment(
            "a",
            vec![Condition::new(
                attribute("country", DataType::String),
                Operator::Equals,
                "VN",
            )],
        );
        seg.rules[0].conditions[0].attribute = None;
        assert!(ConstraintCompiler::new().compile(&[seg]).is_err());
    }
}
