//! Error types for the remittance encoder.

use thiserror::Error;

/// Result type alias for encoder operations
pub type Result<T> = std::result::Result<T, CnabError>;

/// Errors that can occur while building a remittance file.
#[derive(Error, Debug)]
pub enum CnabError {
    /// Failed to read the request or write the produced file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request body is not valid JSON or does not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Summary rendering error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A record or batch is missing a value it cannot be encoded without
    #[error("Missing required field in {record}: {field}")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    /// A supplied value can never be encoded in its fixed field
    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// An assembled line does not have the fixed record width
    #[error("Malformed {record} record: expected 240 characters, got {length}")]
    MalformedRecord { record: String, length: usize },

    /// Batch declares a service type with no processor
    #[error("Unsupported service type: {0}")]
    UnsupportedServiceType(String),

    /// Tax payment declares an unknown tax sub-type
    #[error("Unsupported tax type: {0}")]
    UnsupportedTaxType(String),

    /// Failure inside a batch, tagged with its 1-based batch number
    #[error("Batch {batch}: {source}")]
    Batch {
        batch: u32,
        #[source]
        source: Box<CnabError>,
    },

    /// Missing input file argument
    #[error("Missing input file argument. Usage: cnab240-encoder <request.json> [output.rem]")]
    MissingArgument,
}

impl CnabError {
    pub(crate) fn missing(record: &'static str, field: &'static str) -> Self {
        CnabError::MissingField { record, field }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CnabError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Wraps the error with the number of the batch that produced it.
    pub fn in_batch(self, batch: u32) -> Self {
        CnabError::Batch {
            batch,
            source: Box::new(self),
        }
    }
}

/// Unwraps an optional mandatory value, naming the field when it is absent.
pub(crate) fn require<T>(value: Option<T>, record: &'static str, field: &'static str) -> Result<T> {
    value.ok_or(CnabError::MissingField { record, field })
}

/// Like [`require`] for text, treating blank strings as absent.
pub(crate) fn require_text<'a>(
    value: Option<&'a str>,
    record: &'static str,
    field: &'static str,
) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CnabError::MissingField { record, field }),
    }
}
