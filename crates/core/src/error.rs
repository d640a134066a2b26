//! Error types for the magnet-field core.
//!
//! Field sampling and line tracing never fail. Errors only come from
//! configuration, addressing a magnet slot that does not exist, colour
//! parsing and snapshot I/O.

use thiserror::Error;

/// Errors produced by configuration and scene operations.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Domain width or height was zero, negative or not finite.
    #[error("invalid dimensions: width and height must be positive and finite")]
    InvalidDimensions,

    /// A tunable constant was outside its accepted range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A magnet slot index did not refer to a magnet in the scene.
    #[error("unknown magnet slot {index} (scene has {count} magnets)")]
    UnknownMagnet { index: usize, count: usize },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Writing a snapshot or reading an input file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl FieldError {
    /// Shorthand for [`FieldError::InvalidParam`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        FieldError::InvalidParam {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}
