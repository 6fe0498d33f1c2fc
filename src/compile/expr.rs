//! Boolean expression AST and SMT-LIB renderer
//!
//! The compiler builds this small tree instead of concatenating strings so
//! free-form condition values cannot inject solver syntax; the renderer is
//! the single place that knows the wire format.

use std::fmt::Write;

use crate::model::DataType;

/// Symbolic sort an attribute is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    /// Boolean sort.
    Bool,
    /// Integer sort.
    Int,
    /// String sort.
    String,
}

impl Sort {
    /// Sort inference: boolean → Bool, number → Int, string/enum → String.
    ///
    /// Enum values are encoded as quoted string literals, not a separate
    /// enumerated sort.
    #[must_use]
    pub const fn for_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => Self::Bool,
            DataType::Number => Self::Int,
            DataType::String | DataType::Enum => Self::String,
        }
    }

    /// Wire name of the sort.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::String => "String",
        }
    }
}

/// A typed literal appearing on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Quoted string literal.
    Str(String),
    /// Bare integer literal.
    Int(i64),
    /// Bare boolean literal.
    Bool(bool),
}

/// Comparison operator of a [`BoolExpr::Compare`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equality.
    Eq,
    /// Strictly greater.
    Gt,
    /// Strictly less.
    Lt,
    /// Greater or equal.
    Ge,
    /// Less or equal.
    Le,
}

impl CompareOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

/// Boolean structure of a compiled constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoolExpr {
    /// Conjunction of sub-expressions.
    And(Vec<BoolExpr>),
    /// Disjunction of sub-expressions.
    Or(Vec<BoolExpr>),
    /// Negation.
    Not(Box<BoolExpr>),
    /// `(op attr literal)` comparison.
    Compare {
        /// Comparison operator.
        op: CompareOp,
        /// Symbol name of the attribute.
        attr: String,
        /// Right-hand literal.
        value: Literal,
    },
    /// `(str.contains attr "value")` substring test.
    Contains {
        /// Symbol name of the attribute.
        attr: String,
        /// Needle value.
        value: String,
    },
}

impl BoolExpr {
    /// Equality comparison helper.
    #[must_use]
    pub const fn equals(attr: String, value: Literal) -> Self {
        Self::Compare {
            op: CompareOp::Eq,
            attr,
            value,
        }
    }

    /// Negation helper.
    #[must_use]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Render into `out` in the solver's concrete syntax.
    pub fn render(&self, out: &mut String) {
        match self {
            Self::And(terms) => render_variadic(out, "and", terms),
            Self::Or(terms) => render_variadic(out, "or", terms),
            Self::Not(inner) => {
                out.push_str("(not ");
                inner.render(out);
                out.push(')');
            }
            Self::Compare { op, attr, value } => {
                let _ = write!(out, "({} {attr} ", op.symbol());
                render_literal(out, value);
                out.push(')');
            }
            Self::Contains { attr, value } => {
                let _ = write!(out, "(str.contains {attr} ");
                render_string(out, value);
                out.push(')');
            }
        }
    }
}

fn render_variadic(out: &mut String, head: &str, terms: &[BoolExpr]) {
    out.push('(');
    out.push_str(head);
    for term in terms {
        out.push(' ');
        term.render(out);
    }
    out.push(')');
}

fn render_literal(out: &mut String, literal: &Literal) {
    match literal {
        Literal::Str(s) => render_string(out, s),
        Literal::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Literal::Bool(b) => {
            let _ = write!(out, "{b}");
        }
    }
}

/// Quote a string literal, doubling embedded quotes per SMT-LIB 2.6 so
/// values cannot terminate the literal early.
fn render_string(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(expr: &BoolExpr) -> String {
        let mut out = String::new();
        expr.render(&mut out);
        out
    }

    #[test]
    fn test_string_equality() {
        let expr = BoolExpr::equals("country".into(), Literal::Str("VN".into()));
        assert_eq!(rendered(&expr), "(= country \"VN\")");
    }

    #[test]
    fn test_numeric_comparison_unquoted() {
        let expr = BoolExpr::Compare {
            op: CompareOp::Ge,
            attr: "age".into(),
            value: Literal::Int(18),
        };
        assert_eq!(rendered(&expr), "(>= age 18)");
    }

    #[test]
    fn test_boolean_literal() {
        let expr = BoolExpr::equals("beta".into(), Literal::Bool(true));
        assert_eq!(rendered(&expr), "(= beta true)");
    }

    #[test]
    fn test_nested_structure() {
        let expr = BoolExpr::And(vec![
            BoolExpr::Or(vec![
                BoolExpr::equals("x".into(), Literal::Str("a".into())),
                BoolExpr::equals("x".into(), Literal::Str("b".into())),
            ]),
            BoolExpr::not(BoolExpr::Contains {
                attr: "email".into(),
                value: "@test".into(),
            }),
        ]);
        assert_eq!(
            rendered(&expr),
            "(and (or (= x \"a\") (= x \"b\")) (not (str.contains email \"@test\")))"
        );
    }

    #[test]
    fn test_embedded_quote_is_escaped() {
        let expr = BoolExpr::equals("name".into(), Literal::Str("a\"b".into()));
        assert_eq!(rendered(&expr), "(= name \"a\"\"b\")");
    }
}
