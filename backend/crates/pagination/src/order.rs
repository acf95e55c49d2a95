//! Whitelisted sort keys and directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column a page is ordered by.
///
/// Parsing never fails: anything other than `name` orders by identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    /// Order by record identifier.
    #[default]
    Id,
    /// Order by record name.
    Name,
}

impl SortKey {
    /// Parse a caller-supplied sort key, falling back to [`SortKey::Id`].
    ///
    /// # Examples
    /// ```
    /// use pagination::SortKey;
    ///
    /// assert_eq!(SortKey::parse("name"), SortKey::Name);
    /// assert_eq!(SortKey::parse("created_at; DROP TABLE things"), SortKey::Id);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Self::Name,
            _ => Self::Id,
        }
    }

    /// Stable lowercase token for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction a page is ordered in.
///
/// Parsing never fails: anything other than `asc` sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortDirection {
    /// Smallest value first.
    Asc,
    /// Largest value first.
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a caller-supplied direction, falling back to [`SortDirection::Desc`].
    ///
    /// # Examples
    /// ```
    /// use pagination::SortDirection;
    ///
    /// assert_eq!(SortDirection::parse("ASC"), SortDirection::Asc);
    /// assert_eq!(SortDirection::parse("sideways"), SortDirection::Desc);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Stable lowercase token for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl From<String> for SortDirection {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SortDirection> for String {
    fn from(value: SortDirection) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
