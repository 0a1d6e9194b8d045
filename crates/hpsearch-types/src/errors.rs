use thiserror::Error;

/// Top-level error type for the hyperparameter search core.
#[derive(Error, Debug)]
pub enum HpError {
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    #[error("invalid iteration: {0}")]
    InvalidIteration(String),

    #[error("no result: {0}")]
    NoResult(String),

    #[error("numeric failure: {0}")]
    NumericFailure(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for hyperparameter search operations.
pub type HpResult<T> = Result<T, HpError>;

/// Macro for creating `InvalidSpec` errors.
#[macro_export]
macro_rules! invalid_spec {
    ($($arg:tt)*) => {
        $crate::HpError::InvalidSpec(format!($($arg)*))
    };
}

/// Macro for creating `InvalidIteration` errors.
#[macro_export]
macro_rules! invalid_iteration {
    ($($arg:tt)*) => {
        $crate::HpError::InvalidIteration(format!($($arg)*))
    };
}

/// Macro for creating `NumericFailure` errors.
#[macro_export]
macro_rules! numeric_failure {
    ($($arg:tt)*) => {
        $crate::HpError::NumericFailure(format!($($arg)*))
    };
}

/// Macro for creating configuration errors.
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::HpError::Config(format!($($arg)*))
    };
}
