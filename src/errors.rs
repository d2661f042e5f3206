//! Typed errors for the clustering engine.
//!
//! Parse and I/O failures stay on `anyhow` at the analyzer/CLI layer; the
//! engine's two contract violations get their own variants so callers can
//! match on them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// Summary extraction was requested on a run that was never executed.
    /// Recoverable: execute the run first.
    #[error("clustering run '{0}' has not been executed")]
    UnexecutedRun(String),

    /// The configuration cannot be forwarded to a clustering algorithm
    /// as-is (e.g. both a cluster count and a distance threshold).
    #[error("invalid clustering configuration: {0}")]
    InvalidConfig(String),
}
