//! Error types for segsolve
//!
//! Every class aborts the current conflict check. Callers must fail closed:
//! none of these may be interpreted as "no conflict".

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Segsolve error types
#[derive(Error, Debug)]
pub enum Error {
    /// Rule-model invariant violated before compilation
    #[error("validation error: {0}")]
    Validation(String),

    /// Constraint rendering failed on input that should have been rejected
    /// earlier; compilation fails closed instead of emitting a weakened
    /// constraint
    #[error("compilation error: {0}")]
    Compilation(String),

    /// Network failure reaching the satisfiability service
    #[error("solver transport error: {0}")]
    Transport(String),

    /// Solver responded with a non-success status or an unparsable body
    #[error("solver protocol error: {0}")]
    Protocol(String),

    /// Candidate experiment overlaps one or more scheduled/running experiments
    #[error("experiment conflicts detected: {0}")]
    ExperimentConflict(String),
}
