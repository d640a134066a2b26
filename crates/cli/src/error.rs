//! CLI errors and their process exit codes.
//!
//! clap exits with 2 on bad arguments before `run` is reached; everything
//! after that maps onto the codes below.

use std::path::Path;

use magnet_field_core::FieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Rejected parameters or an out-of-range magnet slot.
    #[error(transparent)]
    Field(FieldError),
    #[error("{0}")]
    Io(String),
    /// Malformed user input: points, `--params` or an events file.
    #[error("{0}")]
    Input(String),
    #[error("serializing output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Field(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Wraps a filesystem failure with the path and what was being done to it.
    pub fn io(action: &str, path: &Path, err: std::io::Error) -> Self {
        CliError::Io(format!("{action} {}: {err}", path.display()))
    }
}

// PNG write failures surface from the render crate as `FieldError::Io`;
// colour strings come from the command line, so they count as input.
impl From<FieldError> for CliError {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::Io(msg) => CliError::Io(msg),
            e @ FieldError::InvalidColor(_) => CliError::Input(e.to_string()),
            other => CliError::Field(other),
        }
    }
}
