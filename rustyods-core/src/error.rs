//! Error types for rustyods-core.

use thiserror::Error;

use crate::address::AddressError;

/// Errors raised while building or writing a spreadsheet.
#[derive(Error, Debug)]
pub enum RustyodsError {
    /// Underlying I/O failure while writing the container.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip layer rejected an entry.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed address text.
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: &'static str },

    #[error("Invalid style name '{name}': {reason}")]
    InvalidStyleName { name: String, reason: &'static str },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Named range already exists: {0}")]
    NamedRangeAlreadyExists(String),

    /// A style was touched after `freeze()` without having been registered before.
    #[error("Style container is frozen and style '{0}' was never registered")]
    StylesFrozen(String),

    /// Streaming documents need every style declared before content is added.
    #[error("Styles must be frozen before {0} in streaming mode")]
    StylesNotFrozen(&'static str),

    /// Declarations written ahead of the tables, added after content started.
    #[error("'{0}' must be declared before styles are frozen in streaming mode")]
    LateDeclaration(String),

    #[error("Row {row} of table '{table}' has already been flushed")]
    RowFlushed { table: String, row: u32 },

    #[error("Index {index} exceeds the addressable maximum {max}")]
    IndexOutOfBounds { index: u32, max: u32 },

    #[error("Cell {0} is covered by a merge and cannot anchor another one")]
    CoveredCell(String),

    #[error("Merge at {anchor} overlaps the merge anchored at {other}")]
    MergeOverlap { anchor: String, other: String },

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Document has already been closed")]
    Closed,

    #[error("{0}")]
    Custom(String),
}

impl RustyodsError {
    /// Build a free-form error.
    pub fn custom<S: Into<String>>(message: S) -> Self {
        RustyodsError::Custom(message.into())
    }

    /// True for errors caused by calling the API out of contract, as opposed
    /// to I/O failures.
    pub fn is_usage_error(&self) -> bool {
        !matches!(
            self,
            RustyodsError::Io(_) | RustyodsError::Zip(_) | RustyodsError::Encryption(_)
        )
    }
}

/// Result type alias for rustyods operations.
pub type Result<T> = std::result::Result<T, RustyodsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_classification() {
        assert!(RustyodsError::StylesFrozen("ce1".into()).is_usage_error());
        assert!(RustyodsError::custom("bad").is_usage_error());
        let io = RustyodsError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_usage_error());
    }

    #[test]
    fn test_display() {
        let err = RustyodsError::RowFlushed { table: "Data".into(), row: 3 };
        assert_eq!(err.to_string(), "Row 3 of table 'Data' has already been flushed");
    }
}
