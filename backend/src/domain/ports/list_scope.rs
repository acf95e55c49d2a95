//! Visibility scopes for list queries.

/// Narrows a list query to the records a caller may see.
///
/// The scope becomes one more predicate ANDed with the page filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListScope {
    /// Administrative access: every record.
    #[default]
    All,
    /// Records belonging to any of these groups.
    Groups(Vec<String>),
    /// Records belonging to groups of this organisation.
    Organization(String),
}

impl ListScope {
    /// Scope covering a single group.
    pub fn group(group_id: impl Into<String>) -> Self {
        Self::Groups(vec![group_id.into()])
    }
}
