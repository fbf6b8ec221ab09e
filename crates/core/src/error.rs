use thiserror::Error;

/// Errors in environment-driven configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A key parsed but its value cannot be used.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}
