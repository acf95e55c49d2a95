//! Port for thing-to-channel connections.

use async_trait::async_trait;

use crate::domain::Connection;

use super::RepositoryError;

/// Port for linking things to channels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Connect every thing to the channel atomically.
    ///
    /// An existing pairing fails the batch with `Conflict`; a missing channel
    /// or thing fails it with `NotFound`.
    async fn connect(
        &self,
        channel_id: &str,
        thing_ids: &[String],
    ) -> Result<Vec<Connection>, RepositoryError>;

    /// Disconnect every thing from the channel atomically.
    ///
    /// Any pairing that does not exist fails the batch with `NotFound`.
    async fn disconnect(&self, channel_id: &str, thing_ids: &[String])
    -> Result<(), RepositoryError>;

    /// Whether the thing is connected to the channel.
    async fn has_connection(
        &self,
        channel_id: &str,
        thing_id: &str,
    ) -> Result<bool, RepositoryError>;

    /// Every connection of a thing, ordered by channel id.
    async fn retrieve_by_thing(&self, thing_id: &str)
    -> Result<Vec<Connection>, RepositoryError>;
}
