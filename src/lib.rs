//! # Segsolve: Targeting-Rule Constraint Compiler and Conflict Detector
//!
//! Segsolve is the symbolic-reasoning core of a feature-flag /
//! experimentation management plane. It turns trees of typed audience
//! conditions into a satisfiability query and uses the answer to decide
//! whether two or more targeting rules can match the same user profile
//! simultaneously.
//!
//! The crate deliberately does **not** solve anything itself: satisfiability
//! is a remote capability behind the narrow [`solver::SatChecker`] trait,
//! and persistence is behind [`conflict::ExperimentCatalog`]. Everything
//! in between — the rule model, the constraint compiler, and the conflict
//! detector — is pure, synchronous string-building work.
//!
//! ## Example
//!
//! ```rust,no_run
//! use segsolve::compile::ConstraintCompiler;
//! use segsolve::model::Segment;
//!
//! # fn demo(segments: &[Segment]) -> segsolve::Result<()> {
//! let compiler = ConstraintCompiler::new();
//! let document = compiler.compile(segments)?;
//! println!("{}", document.render());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod compile;
pub mod conflict;
pub mod error;
pub mod model;
pub mod solver;

pub use error::{Error, Result};
