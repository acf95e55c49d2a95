//! Port for thing persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::Thing;

use super::{ListScope, RepositoryError};

/// Port for storing and querying things.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThingRepository: Send + Sync {
    /// Insert every thing atomically and return them as stored.
    async fn save(&self, things: &[Thing]) -> Result<Vec<Thing>, RepositoryError>;

    /// Update name and metadata of a thing within its group.
    async fn update(&self, thing: &Thing) -> Result<Thing, RepositoryError>;

    /// Rotate the access key of a thing.
    async fn update_key(&self, id: &str, key: &str) -> Result<(), RepositoryError>;

    /// Fetch one thing.
    async fn retrieve_by_id(&self, id: &str) -> Result<Thing, RepositoryError>;

    /// Fetch the thing owning an access key.
    async fn retrieve_by_key(&self, key: &str) -> Result<Thing, RepositoryError>;

    /// Fetch one page of things visible in `scope`.
    async fn retrieve_by_filter(
        &self,
        scope: &ListScope,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError>;

    /// Fetch one page of the things of a single group.
    async fn retrieve_by_group(
        &self,
        group_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError>;

    /// Fetch one page of the things built from a profile.
    async fn retrieve_by_profile(
        &self,
        profile_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError>;

    /// Fetch one page of the things connected to a channel.
    async fn retrieve_by_channel(
        &self,
        channel_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError>;

    /// Remove things and their connections.
    async fn remove(&self, ids: &[String]) -> Result<(), RepositoryError>;
}
