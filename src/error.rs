//! Error types for the sales aggregator.

use crate::config::DefinitionKind;
use thiserror::Error;

/// Result type alias for aggregator operations
pub type Result<T> = std::result::Result<T, SalesError>;

/// Flat classification of every failure the aggregator can report.
///
/// Every kind aborts the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingArgument,
    FileNotFound,
    InvalidFormat,
    NonSequentialFiles,
    RecordFormatError,
    UnknownBranchCode,
    UnknownCommodityCode,
    AmountOverflow,
    UnknownError,
    WriteError,
}

/// Errors that can occur during a run.
#[derive(Error, Debug)]
pub enum SalesError {
    /// The CLI was not given exactly one directory argument
    #[error("An unexpected error occurred. Usage: sales-aggregator <directory>")]
    MissingArgument,

    /// A required definition file is absent
    #[error("The {kind} does not exist")]
    FileNotFound { kind: DefinitionKind },

    /// A definition line has the wrong field count or a malformed code
    #[error("The {kind} has an invalid format (line {line})")]
    InvalidFormat { kind: DefinitionKind, line: usize },

    /// Record file numbering has a gap
    #[error("Sales file names are not sequential ({former} -> {latter})")]
    NonSequentialFiles { former: String, latter: String },

    /// A record file does not have the expected number of lines
    #[error("{file} has an invalid format ({lines} lines)")]
    RecordFormat { file: String, lines: usize },

    /// A record references a branch code missing from the branch definitions
    #[error("{file} has an invalid branch code {code:?}")]
    UnknownBranchCode { file: String, code: String },

    /// A record references a commodity code missing from the commodity definitions
    #[error("{file} has an invalid commodity code {code:?}")]
    UnknownCommodityCode { file: String, code: String },

    /// A running total reached the 10-digit ceiling
    #[error("Total amount exceeded 10 digits (code {code}, total {total})")]
    AmountOverflow { code: String, total: String },

    /// Catch-all, also used for malformed amount text
    #[error("An unexpected error occurred")]
    Unexpected { detail: String },

    /// Failed to list or read an input file
    #[error("An unexpected error occurred: {0}")]
    Io(#[from] std::io::Error),

    /// A configured code pattern failed to compile
    #[error("An unexpected error occurred: invalid code pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// An output file could not be created or fully written
    #[error("Failed to write {file}: {source}")]
    Write {
        file: String,
        #[source]
        source: csv::Error,
    },
}

impl SalesError {
    /// Returns the flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SalesError::MissingArgument => ErrorKind::MissingArgument,
            SalesError::FileNotFound { .. } => ErrorKind::FileNotFound,
            SalesError::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            SalesError::NonSequentialFiles { .. } => ErrorKind::NonSequentialFiles,
            SalesError::RecordFormat { .. } => ErrorKind::RecordFormatError,
            SalesError::UnknownBranchCode { .. } => ErrorKind::UnknownBranchCode,
            SalesError::UnknownCommodityCode { .. } => ErrorKind::UnknownCommodityCode,
            SalesError::AmountOverflow { .. } => ErrorKind::AmountOverflow,
            SalesError::Unexpected { .. } | SalesError::Io(_) | SalesError::InvalidPattern(_) => {
                ErrorKind::UnknownError
            }
            SalesError::Write { .. } => ErrorKind::WriteError,
        }
    }
}
