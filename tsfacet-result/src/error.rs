use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all tsfacet operations.
///
/// The aggregation core itself has very few failure modes: missing readings
/// are skipped, never reported. What remains are caller contract violations,
/// failures of the column backings that feed a scan, and corrupt transport
/// bytes on the coordinator side.
///
/// # Thread Safety
///
/// `Error` implements `Send` and `Sync`, so a failure observed on a scan
/// worker thread can be handed back to the coordinating thread unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while opening or reading an on-disk segment file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error while casting or slicing an in-memory column.
    ///
    /// Typically raised when a segment column has to be widened to `Int64`
    /// or when the final page is assembled into a `RecordBatch`.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while decoding an on-disk segment.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Invalid caller input.
    ///
    /// Raised for:
    /// - Negative `start` or `size` passed to pagination
    /// - Facet requests with empty field names
    /// - Partial results whose facet name or requested window disagrees with
    ///   the merge they are pushed into
    /// - Columns whose data type cannot be read as integers
    ///
    /// # Recovery
    ///
    /// Fix the input and retry; no shared state was modified.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// A facet field is not present in the scanned segment.
    #[error("column '{0}' not found in segment")]
    ColumnNotFound(String),

    /// A segment aggregator was used after its map was handed off.
    ///
    /// `build` moves the map into a partial result. Calling `on_document` or
    /// `build` again afterwards is a contract violation; the already-built
    /// partial result is unaffected.
    #[error("segment aggregator already built its partial result")]
    AggregatorFinished,

    /// Partial-result bytes could not be decoded.
    ///
    /// Covers truncated or corrupt payloads, unknown format versions, foreign
    /// stream types, and payloads that violate the one-entry-per-key rule.
    #[error("partial result decode error: {0}")]
    Decode(String),

    /// The surrounding query was cancelled while a segment scan was in flight.
    ///
    /// Maps held by abandoned scans have already been returned to their pool
    /// when this error reaches the caller.
    #[error("facet execution cancelled")]
    Cancelled,

    /// Internal error indicating a bug or unexpected state.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create an [`Error::InvalidArgumentError`] from any displayable message.
    ///
    /// # Examples
    ///
    /// ```
    /// use tsfacet_result::Error;
    ///
    /// let err = Error::invalid_argument("start must be >= 0");
    /// assert!(matches!(err, Error::InvalidArgumentError(msg) if msg.contains("start")));
    /// ```
    #[inline]
    pub fn invalid_argument<E: fmt::Display>(msg: E) -> Self {
        Error::InvalidArgumentError(msg.to_string())
    }

    /// Create an [`Error::Decode`] from any displayable error.
    ///
    /// Convenience for mapping codec errors while preserving their message.
    #[inline]
    pub fn decode<E: fmt::Display>(err: E) -> Self {
        Error::Decode(err.to_string())
    }

    /// Whether this error is a caller contract violation rather than a data
    /// source or transport failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgumentError(_) | Error::AggregatorFinished
        )
    }
}
