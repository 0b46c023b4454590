use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by an evaluator backed by an external engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// No response within the configured deadline. Transient: the client
    /// retries once at reduced depth before surfacing this.
    #[error("engine timed out after {0:?}")]
    Timeout(Duration),

    /// The engine process cannot be reached at all. Fatal for the current
    /// search invocation; never retried.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The engine answered with something unparseable. Transient unless
    /// repeated, at which point the client escalates to `Unavailable`.
    #[error("engine protocol violation: {0}")]
    Protocol(String),
}
