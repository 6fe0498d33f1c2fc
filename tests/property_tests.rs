//! Property-based tests for the constraint compiler
//!
//! Invariants checked over randomly shaped segment sets:
//! - exactly one declaration per distinct attribute name
//! - the rendered document has balanced parentheses and quotes
//! - every declared symbol appears in the assertion

use proptest::prelude::*;
use segsolve::compile::ConstraintCompiler;
use segsolve::model::{Attribute, Condition, DataType, Operator, Segment, SegmentRule};

/// Attribute pool with stable name→type bindings so cross-segment reuse
/// never produces conflicting sorts.
fn pool() -> Vec<Attribute> {
    let mut tier = Attribute::new(4, "tier", DataType::Enum);
    tier.enum_options = vec!["free".into(), "pro".into()];
    vec![
        Attribute::new(1, "country", DataType::String),
        Attribute::new(2, "age", DataType::Number),
        Attribute::new(3, "beta", DataType::Boolean),
        tier,
    ]
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    (0usize..4).prop_flat_map(|idx| {
        let attribute = pool().swap_remove(idx);
        match attribute.data_type {
            DataType::String | DataType::Enum => (
                prop_oneof![
                    Just(Operator::Equals),
                    Just(Operator::NotEquals),
                    Just(Operator::Contains),
                    Just(Operator::NotContains),
                    Just(Operator::In),
                    Just(Operator::NotIn),
                ],
                "[a-zA-Z0-9 ,]{1,12}",
            )
                .prop_map(move |(operator, value)| {
                    Condition::new(attribute.clone(), operator, value)
                })
                .boxed(),
            DataType::Number => (
                prop_oneof![
                    Just(Operator::Equals),
                    Just(Operator::NotEquals),
                    Just(Operator::GreaterThan),
                    Just(Operator::LessThan),
                    Just(Operator::GreaterThanOrEqual),
                    Just(Operator::LessThanOrEqual),
                ],
                -1000i64..1000,
            )
                .prop_map(move |(operator, value)| {
                    Condition::new(attribute.clone(), operator, value.to_string())
                })
                .boxed(),
            DataType::Boolean => any::<bool>()
                .prop_map(move |value| {
                    Condition::new(attribute.clone(), Operator::Equals, value.to_string())
                })
                .boxed(),
        }
    })
}

fn arb_segments() -> impl Strategy<Value = Vec<Segment>> {
    let rule = proptest::collection::vec(arb_condition(), 1..4);
    let rules = proptest::collection::vec(rule, 1..4);
    let segment = rules.prop_map(|rules| {
        Segment::new(
            1,
            "seg",
            rules
                .into_iter()
                .enumerate()
                .map(|(i, conditions)| SegmentRule {
                    id: u32::try_from(i + 1).unwrap(),
                    name: format!("r{i}"),
                    conditions,
                })
                .collect(),
        )
    });
    proptest::collection::vec(segment, 1..4)
}

/// Check parenthesis nesting, ignoring parentheses inside string literals.
fn balanced_outside_strings(text: &str) -> bool {
    let mut depth: i64 = 0;
    let mut in_string = false;
    for ch in text.chars() {
        match ch {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !in_string
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_one_declaration_per_distinct_name(segments in arb_segments()) {
        let doc = ConstraintCompiler::new().compile(&segments).unwrap();

        let mut referenced: Vec<&str> = segments
            .iter()
            .flat_map(|s| s.rules.iter())
            .flat_map(|r| r.conditions.iter())
            .map(|c| c.attribute.as_ref().unwrap().name.as_str())
            .collect();
        referenced.sort_unstable();
        referenced.dedup();

        let mut declared: Vec<&str> = doc
            .declarations()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        declared.sort_unstable();

        prop_assert_eq!(declared, referenced);
    }

    #[test]
    fn prop_rendered_document_is_well_formed(segments in arb_segments()) {
        let doc = ConstraintCompiler::new().compile(&segments).unwrap();
        let text = doc.render();

        prop_assert!(balanced_outside_strings(&text));
        prop_assert!(text.contains("(assert (and "));
        for (name, _) in doc.declarations() {
            let decl = format!("(declare-const {name} ");
            prop_assert!(text.contains(&decl));
        }
    }

    #[test]
    fn prop_compilation_is_deterministic(segments in arb_segments()) {
        let compiler = ConstraintCompiler::new();
        let first = compiler.compile(&segments).unwrap().render();
        let second = compiler.compile(&segments).unwrap().render();
        prop_assert_eq!(first, second);
    }
}
