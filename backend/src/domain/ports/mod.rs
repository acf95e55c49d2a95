//! Repository ports and the shared error taxonomy.

mod macros;
pub(crate) use macros::define_port_error;

mod connection_repository;
mod group_member_repository;
mod group_repository;
mod list_scope;
mod profile_repository;
mod repository_error;
mod thing_repository;

#[cfg(test)]
pub use connection_repository::MockConnectionRepository;
pub use connection_repository::ConnectionRepository;
#[cfg(test)]
pub use group_member_repository::MockGroupMemberRepository;
pub use group_member_repository::GroupMemberRepository;
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::GroupRepository;
pub use list_scope::ListScope;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::ProfileRepository;
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use thing_repository::MockThingRepository;
pub use thing_repository::ThingRepository;
