//! Port for per-group role, policy and membership records.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{GroupMember, MemberTable};

use super::RepositoryError;

/// Port for one member table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupMemberRepository: Send + Sync {
    /// Table this repository reads and writes.
    fn table(&self) -> MemberTable;

    /// Insert every record atomically.
    ///
    /// A member that already holds a record in the group fails the batch
    /// with `Conflict`.
    async fn save(&self, members: &[GroupMember]) -> Result<Vec<GroupMember>, RepositoryError>;

    /// Replace the role of an existing record.
    async fn update(&self, member: &GroupMember) -> Result<GroupMember, RepositoryError>;

    /// Fetch the record of one member in one group.
    async fn retrieve(&self, group_id: &str, member_id: &str)
    -> Result<GroupMember, RepositoryError>;

    /// Fetch one page of a group's records.
    ///
    /// The page name filter matches member ids.
    async fn retrieve_by_group(
        &self,
        group_id: &str,
        request: &PageRequest,
    ) -> Result<Page<GroupMember>, RepositoryError>;

    /// Remove records of the given members atomically.
    ///
    /// Any member without a record fails the batch with `NotFound`.
    async fn remove(&self, group_id: &str, member_ids: &[String]) -> Result<(), RepositoryError>;
}
