//! Port for group persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::Group;

use super::{ListScope, RepositoryError};

/// Port for storing and querying groups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert every group atomically and return them as stored.
    async fn save(&self, groups: &[Group]) -> Result<Vec<Group>, RepositoryError>;

    /// Update name, description, metadata and `updated_at`.
    ///
    /// Empty name and description are left untouched; metadata is always
    /// replaced.
    async fn update(&self, group: &Group) -> Result<Group, RepositoryError>;

    /// Fetch one group.
    async fn retrieve_by_id(&self, id: &str) -> Result<Group, RepositoryError>;

    /// Fetch every existing group among `ids`, ordered by id.
    async fn retrieve_by_ids(&self, ids: &[String]) -> Result<Vec<Group>, RepositoryError>;

    /// Fetch one page of groups visible in `scope`.
    ///
    /// [`ListScope::Groups`] matches the group ids themselves and
    /// [`ListScope::Organization`] matches `org_id`.
    async fn retrieve_by_filter(
        &self,
        scope: &ListScope,
        request: &PageRequest,
    ) -> Result<Page<Group>, RepositoryError>;

    /// Remove groups together with everything they own.
    async fn remove(&self, ids: &[String]) -> Result<(), RepositoryError>;
}
