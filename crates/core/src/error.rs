use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics fetch failure. Fatal to the analysis pass — the caller must
    /// be able to distinguish "no campaigns" from "fetch failed".
    #[error("Metrics provider error: {0}")]
    Provider(String),

    /// Advisor enrichment failure. Recovered at the bridge boundary and
    /// never surfaced to the end user.
    #[error("Advisor error: {0}")]
    Advisor(String),

    /// Remediation failure. Recovered at the coordinator boundary and
    /// returned as a failed result, never raised.
    #[error("Remediation error: {0}")]
    Remediation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
