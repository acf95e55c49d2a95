//! Page envelope returned by list queries.

use serde::{Deserialize, Serialize};

use crate::request::PageRequest;

/// One window of matching records plus the size of the full match set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records inside the requested window.
    pub items: Vec<T>,
    /// Number of records matching the filter, ignoring the window.
    pub total: u64,
    /// Offset echoed from the request.
    pub offset: u64,
    /// Limit echoed from the request.
    pub limit: u64,
}

impl<T> Page<T> {
    /// Build a page for `request`.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            offset: request.offset,
            limit: request.limit,
        }
    }

    /// Convert every item, keeping the window metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }

    /// Whether matching records exist beyond this window.
    #[must_use]
    pub fn has_more(&self) -> bool {
        let seen = self.offset.saturating_add(self.items.len() as u64);
        seen < self.total
    }
}
