use tsfacet_aggregate::{DEFAULT_SIZE, DEFAULT_START, FacetHeader};
use tsfacet_result::{Error, Result};

/// A latest facet request: which fields to read and which page to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRequest {
    pub name: String,
    pub key_field: String,
    pub value_field: String,
    pub ts_field: String,
    pub size: i64,
    pub start: i64,
}

impl FacetRequest {
    pub fn new(
        name: impl Into<String>,
        key_field: impl Into<String>,
        value_field: impl Into<String>,
        ts_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            key_field: key_field.into(),
            value_field: value_field.into(),
            ts_field: ts_field.into(),
            size: i64::from(DEFAULT_SIZE),
            start: i64::from(DEFAULT_START),
        }
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    /// Reject empty field names and windows that do not fit a facet header.
    pub fn validate(&self) -> Result<()> {
        for (what, field) in [
            ("key", &self.key_field),
            ("value", &self.value_field),
            ("timestamp", &self.ts_field),
        ] {
            if field.is_empty() {
                return Err(Error::InvalidArgumentError(format!(
                    "facet '{}' has an empty {what} field",
                    self.name
                )));
            }
        }
        self.header().map(|_| ())
    }

    /// Header carried by every partial of this request.
    pub fn header(&self) -> Result<FacetHeader> {
        let size = u32::try_from(self.size).map_err(|_| {
            Error::InvalidArgumentError(format!(
                "facet '{}': size must be in 0..={}, got {}",
                self.name,
                u32::MAX,
                self.size
            ))
        })?;
        let start = u32::try_from(self.start).map_err(|_| {
            Error::InvalidArgumentError(format!(
                "facet '{}': start must be in 0..={}, got {}",
                self.name,
                u32::MAX,
                self.start
            ))
        })?;
        Ok(FacetHeader::new(self.name.clone(), size, start))
    }
}
