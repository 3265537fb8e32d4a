use crate::error::Error;

/// Result type alias used throughout tsfacet.
///
/// Shorthand for `std::result::Result<T, Error>`. Every fallible tsfacet
/// operation returns this type.
pub type Result<T> = std::result::Result<T, Error>;
