use std::path::PathBuf;

use thiserror::Error;

use super::command::Operation;

/// Failure to materialise a [`Dataset`](super::model::Dataset) from storage.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

/// Failure to turn a raw instruction into a statistic.
///
/// The `Display` text of every variant is the user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Invalid command format. Try: '<operation> of <column>' like 'mean of age'")]
    Malformed,

    #[error("Column '{column}' not found in the dataset. Available columns: {}", .available.join(", "))]
    UnknownColumn { column: String, available: Vec<String> },

    #[error("Unknown operation '{0}'. Try: mean, median, mode, min, max, or std")]
    UnknownOperation(String),

    #[error("Cannot calculate {operation} for '{column}' - it's not a numeric column")]
    TypeMismatch { operation: Operation, column: String },

    #[error("Couldn't calculate {operation} for '{column}': {reason}")]
    Computation {
        operation: Operation,
        column: String,
        reason: String,
    },
}
