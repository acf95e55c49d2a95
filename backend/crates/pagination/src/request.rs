//! Caller-supplied page specification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::order::{SortDirection, SortKey};

/// Default window size used by [`PageRequest::default`].
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest window a caller may request.
pub const MAX_LIMIT: u64 = 100;

/// Metadata probe document: stored metadata must contain every entry.
pub type Metadata = Map<String, Value>;

/// Errors raised when a page request is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The requested window exceeds [`MAX_LIMIT`].
    #[error("limit {limit} exceeds the maximum of {max}")]
    LimitTooLarge {
        /// Requested limit.
        limit: u64,
        /// Permitted maximum.
        max: u64,
    },
    /// The offset cannot be represented by the storage engine.
    #[error("offset {offset} is out of range")]
    OffsetOutOfRange {
        /// Requested offset.
        offset: u64,
    },
}

/// Filter, sort and window parameters for a list query.
///
/// A `limit` of zero means "no row cap", not "zero rows".
///
/// # Examples
/// ```
/// use pagination::{PageRequest, SortDirection, SortKey};
/// use serde_json::json;
///
/// let request = PageRequest::default()
///     .with_name("sensor")
///     .with_metadata_entry("site", json!("north"))
///     .with_order(SortKey::Name, SortDirection::Asc)
///     .with_window(20, 5);
///
/// assert_eq!(request.name_filter(), Some("sensor"));
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Number of matching records to skip.
    pub offset: u64,
    /// Maximum number of records to return; zero disables the cap.
    pub limit: u64,
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Metadata the stored document must contain.
    pub metadata: Metadata,
    /// Sort column.
    pub order: SortKey,
    /// Sort direction.
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            name: None,
            metadata: Metadata::new(),
            order: SortKey::default(),
            direction: SortDirection::default(),
        }
    }
}

impl PageRequest {
    /// Request every matching record in one page.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            limit: 0,
            ..Self::default()
        }
    }

    /// Set the name substring filter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the metadata probe document.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add one entry to the metadata probe document.
    #[must_use]
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Set the sort key and direction.
    #[must_use]
    pub fn with_order(mut self, order: SortKey, direction: SortDirection) -> Self {
        self.order = order;
        self.direction = direction;
        self
    }

    /// Set the offset and limit.
    #[must_use]
    pub fn with_window(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Name filter with surrounding whitespace removed, or `None` when blank.
    #[must_use]
    pub fn name_filter(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Whether the request caps the number of returned rows.
    #[must_use]
    pub const fn is_windowed(&self) -> bool {
        self.limit > 0
    }

    /// Check the window against [`MAX_LIMIT`] and the storage offset range.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::LimitTooLarge`] when `limit` exceeds
    /// [`MAX_LIMIT`], and [`PageRequestError::OffsetOutOfRange`] when `offset`
    /// does not fit a signed 64-bit integer.
    pub fn validate(&self) -> Result<(), PageRequestError> {
        if self.limit > MAX_LIMIT {
            return Err(PageRequestError::LimitTooLarge {
                limit: self.limit,
                max: MAX_LIMIT,
            });
        }
        if i64::try_from(self.offset).is_err() {
            return Err(PageRequestError::OffsetOutOfRange {
                offset: self.offset,
            });
        }
        Ok(())
    }
}
