use thiserror::Error;

/// Failures of the prediction engine itself.
///
/// Missing teams and malformed dates are not errors; they degrade to neutral
/// strength and full weight respectively.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid config for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}
