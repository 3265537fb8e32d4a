//! Error types and result definitions for the tsfacet crates.
//!
//! Every crate in the workspace reports failures through the single [`Error`]
//! enum and the [`Result<T>`] alias, so errors cross crate boundaries with `?`
//! and callers can match on specific variants.
//!
//! # Error Categories
//!
//! - **Data source errors** ([`Error::Io`], [`Error::Arrow`], [`Error::Parquet`]):
//!   failures while opening or decoding segment columns
//! - **Caller contract violations** ([`Error::InvalidArgumentError`],
//!   [`Error::AggregatorFinished`]): negative pagination windows, reuse of a
//!   finished aggregator, mismatched partial results
//! - **Lookup failures** ([`Error::ColumnNotFound`]): a requested field is not
//!   present in a segment
//! - **Transport errors** ([`Error::Decode`]): partial-result bytes that are
//!   corrupt or belong to another stream type
//! - **Cancellation** ([`Error::Cancelled`]): the surrounding query was abandoned
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states
//!
//! Missing key, timestamp or value readings for a document are *not* errors;
//! the aggregation skips those contributions.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
