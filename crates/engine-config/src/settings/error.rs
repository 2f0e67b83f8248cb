use thiserror::Error;

/// Errors raised when building or loading cursor settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A setting was not a valid non-negative integer.
    #[error("Invalid numeric value for {key}: {value:?}")]
    InvalidNumber { key: String, value: String },

    /// The debounce max wait is shorter than the quiet period.
    #[error("Debounce max wait ({max_wait_ms}ms) must not be shorter than wait ({wait_ms}ms)")]
    MaxWaitBelowWait { wait_ms: u64, max_wait_ms: u64 },

    /// A setting is outside its allowed range.
    #[error("Setting {key} out of range: {reason}")]
    OutOfRange { key: &'static str, reason: String },

    /// One or more settings failed validation.
    #[error("Settings validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}
