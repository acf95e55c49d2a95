//! Page request and page envelope primitives for list endpoints.
//!
//! A [`PageRequest`] captures what a caller wants to see: an optional
//! case-insensitive name substring, a metadata probe document, a sort key and
//! direction, and an offset/limit window. A [`Page`] echoes the window back
//! together with the items and the total number of matching records.
//!
//! Sort keys and directions are closed sets. Unrecognised input falls back to
//! [`SortKey::Id`] and [`SortDirection::Desc`] so that callers can never steer
//! a query towards arbitrary columns.
//!
//! The crate is transport and storage agnostic; rendering these values into
//! SQL is the job of the persistence adapters.

mod order;
mod page;
mod request;

pub use order::{SortDirection, SortKey};
pub use page::Page;
pub use request::{DEFAULT_LIMIT, MAX_LIMIT, Metadata, PageRequest, PageRequestError};
