use thiserror::Error;

/// Errors surfaced by layout evaluation, configuration and reporting.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Malformed candidate vector: wrong length or non-finite coordinates.
    #[error("shape error: {0}")]
    Shape(String),

    /// Malformed problem instance.
    #[error("config error: {0}")]
    Config(String),

    /// A non-finite value was produced from finite inputs.
    #[error("numeric error: {0}")]
    Numeric(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
