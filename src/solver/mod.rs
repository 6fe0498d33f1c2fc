//! Solver Client - transport boundary to the satisfiability service
//!
//! The core never solves anything itself; it submits a rendered constraint
//! document and interprets the verdict. The [`SatChecker`] trait keeps the
//! capability pluggable: an embedded solving library or a different remote
//! service can be substituted without touching the compiler.
//!
//! # Example
//!
//! ```rust,no_run
//! use segsolve::solver::{HttpSolver, SatChecker};
//!
//! # async fn example() -> segsolve::Result<()> {
//! let solver = HttpSolver::builder("http://solver:8000").build()?;
//! let outcome = solver.check("(assert false)").await?;
//! assert!(outcome.no_conflict());
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::{HttpSolver, HttpSolverBuilder};

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Verdict of a satisfiability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatVerdict {
    /// A witness assignment exists; the constrained segments overlap.
    Sat,
    /// Provably no assignment exists; the segments are disjoint.
    Unsat,
    /// The solver could not decide.
    Unknown,
}

impl SatVerdict {
    /// Whether a witness assignment exists.
    #[must_use]
    pub const fn is_sat(self) -> bool {
        matches!(self, Self::Sat)
    }
}

/// One variable assignment of a witness model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBinding {
    /// Symbol name, matching a declared attribute.
    pub name: String,
    /// Assigned value; type depends on the attribute's sort.
    pub value: serde_json::Value,
}

/// Outcome of a satisfiability check: the verdict plus, when satisfiable,
/// the witness profile found by the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SatOutcome {
    /// The solver's verdict.
    pub verdict: SatVerdict,
    /// Witness assignments; empty unless the verdict is [`SatVerdict::Sat`].
    pub model: Vec<ModelBinding>,
}

impl SatOutcome {
    /// Conflict semantics derived from the verdict: `true` iff no witness
    /// profile satisfies all constrained segments at once.
    #[must_use]
    pub const fn no_conflict(&self) -> bool {
        !self.verdict.is_sat()
    }
}

/// Remote (or embedded) satisfiability capability.
///
/// Implementations must surface transport and protocol failures as hard
/// errors — never as a verdict — so callers can fail closed.
pub trait SatChecker: Send + Sync {
    /// Check whether `constraint` has a satisfying assignment.
    fn check(&self, constraint: &str) -> impl Future<Output = Result<SatOutcome>> + Send;
}
