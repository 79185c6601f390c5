//! Error types for Pipeboard.
//!
//! Library crates use [`PipeboardError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::{DealId, StageId};

/// Top-level error type for all Pipeboard operations.
#[derive(Debug, thiserror::Error)]
pub enum PipeboardError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Seed or script parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Seed data violates a board invariant (duplicate ids, empty stage list, ...).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A stage id that is not part of the board's configuration.
    #[error("unknown stage '{0}'")]
    UnknownStage(StageId),

    /// A deal id that is not on the board.
    #[error("unknown deal '{0}'")]
    UnknownDeal(DealId),

    /// `move_deal` was asked to take a deal from a stage that does not hold it.
    #[error("deal '{deal}' is not in stage '{stage}'")]
    DealNotInStage { deal: DealId, stage: StageId },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PipeboardError>;

impl PipeboardError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PipeboardError::config("activation_distance must be positive");
        assert_eq!(
            err.to_string(),
            "config error: activation_distance must be positive"
        );

        let err = PipeboardError::DealNotInStage {
            deal: DealId::from("2"),
            stage: StageId::from("won"),
        };
        assert_eq!(err.to_string(), "deal '2' is not in stage 'won'");

        let err = PipeboardError::validation("duplicate deal id '1'");
        assert!(err.to_string().contains("duplicate deal id"));
    }
}
