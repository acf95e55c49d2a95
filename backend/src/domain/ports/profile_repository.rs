//! Port for profile persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::Profile;

use super::{ListScope, RepositoryError};

/// Port for storing and querying profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert every profile atomically and return them as stored.
    async fn save(&self, profiles: &[Profile]) -> Result<Vec<Profile>, RepositoryError>;

    /// Update name, config and metadata of a profile within its group.
    async fn update(&self, profile: &Profile) -> Result<Profile, RepositoryError>;

    /// Fetch one profile.
    async fn retrieve_by_id(&self, id: &str) -> Result<Profile, RepositoryError>;

    /// Fetch the profile a thing is built from.
    async fn retrieve_by_thing(&self, thing_id: &str) -> Result<Profile, RepositoryError>;

    /// Fetch one page of profiles visible in `scope`.
    async fn retrieve_by_filter(
        &self,
        scope: &ListScope,
        request: &PageRequest,
    ) -> Result<Page<Profile>, RepositoryError>;

    /// Fetch one page of the profiles of a single group.
    async fn retrieve_by_group(
        &self,
        group_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Profile>, RepositoryError>;

    /// Remove profiles. Fails with `EntityInUse` while a thing references one.
    async fn remove(&self, ids: &[String]) -> Result<(), RepositoryError>;
}
