use thiserror::Error;

/// A result type for active learning errors
pub type Result<T> = std::result::Result<T, ActiveError>;

/// An error for the gaussian process active learning algorithm
#[derive(Error, Debug)]
pub enum ActiveError {
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// When GP fitting or prediction fails
    #[error("GP error: {0}")]
    GpError(#[from] gpal_gp::GpError),
    /// When the oracle fails to provide an observation
    #[error("Oracle error: {0}")]
    OracleError(String),
    /// When an Argmin framework is raised
    #[error(transparent)]
    ArgminError(#[from] argmin::core::Error),
    /// When configuration (de)serialization fails
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
