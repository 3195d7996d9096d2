//! Error types for Warden's foundation layer
//!
//! Per-step governance never errors: bad signal ranges are clamped, and a
//! halt is a normal return value. The only failure this layer can produce
//! is a profile that no kernel could operate under, rejected at load time.

use thiserror::Error;

/// Result type for profile validation
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Profile validation errors
#[derive(Debug, Clone, Error)]
pub enum ProfileError {
    /// A profile field holds a value the kernel cannot operate under
    #[error("Invalid profile field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// No built-in profile with the requested name
    #[error("Unknown profile: {name}")]
    UnknownProfile { name: String },
}
