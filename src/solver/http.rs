//! HTTP implementation of [`SatChecker`]
//!
//! Protocol: `POST {endpoint}/solve` with body `{"constraint": text}`;
//! response `{"check_result": "sat" | "unsat" | "unknown", "model": [...]}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ModelBinding, SatChecker, SatOutcome, SatVerdict};
use crate::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SolveRequest<'a> {
    constraint: &'a str,
}

#[derive(Deserialize)]
struct SolveResponse {
    check_result: String,
    #[serde(default)]
    model: Option<Vec<ModelBinding>>,
}

/// Satisfiability checker backed by a remote solver service.
///
/// A solver that never responds must not stall the caller indefinitely, so
/// every request carries a timeout (default 10s, configurable through the
/// builder).
#[derive(Debug, Clone)]
pub struct HttpSolver {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSolver {
    /// Create a builder for the given endpoint base URL.
    #[must_use]
    pub fn builder(endpoint: impl Into<String>) -> HttpSolverBuilder {
        HttpSolverBuilder::new(endpoint)
    }

    /// The configured endpoint base URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SatChecker for HttpSolver {
    async fn check(&self, constraint: &str) -> Result<SatOutcome> {
        let url = format!("{}/solve", self.endpoint.trim_end_matches('/'));
        debug!(url = %url, bytes = constraint.len(), "submitting constraint to solver");

        let response = self
            .client
            .post(&url)
            .json(&SolveRequest { constraint })
            .send()
            .await
            .map_err(|e| Error::Transport(format!("failed to reach solver at {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Protocol(format!(
                "solver returned status {status}"
            )));
        }

        let body: SolveResponse = response
            .json()
            .await
            .map_err(|e| Error::Protocol(format!("unparsable solver response: {e}")))?;

        let verdict = match body.check_result.as_str() {
            "sat" => SatVerdict::Sat,
            "unsat" => SatVerdict::Unsat,
            "unknown" => SatVerdict::Unknown,
            other => {
                return Err(Error::Protocol(format!(
                    "unrecognized check_result '{other}'"
                )))
            }
        };
        debug!(?verdict, "solver verdict received");

        Ok(SatOutcome {
            verdict,
            model: body.model.unwrap_or_default(),
        })
    }
}

/// Builder for [`HttpSolver`].
#[derive(Debug)]
pub struct HttpSolverBuilder {
    endpoint: String,
    timeout: Duration,
}

impl HttpSolverBuilder {
    /// Create a builder for the given endpoint base URL.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the solver client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpSolver> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(HttpSolver {
            client,
            endpoint: self.endpoint,
        })
    }
}
