//! Domain records and repository ports.
//!
//! Purpose: define the plain records exchanged with the persistence layer and
//! the ports (traits plus error taxonomy) that adapters implement. Records are
//! transport agnostic and carry identifiers as strings; adapters validate them
//! at the storage boundary.
//!
//! Public surface:
//! - `Group`, `Profile`, `Thing`, `Connection`, `GroupMember` — persisted
//!   records.
//! - `MemberTable` — selects the role, policy or membership table.
//! - `Metadata` — JSON object stored in `metadata`/`config` columns.
//! - `ports` — repository traits, `ListScope` and `RepositoryError`.

pub mod connection;
pub mod group;
pub mod group_member;
pub mod ports;
pub mod profile;
pub mod thing;

pub use self::connection::Connection;
pub use self::group::Group;
pub use self::group_member::{GroupMember, MemberTable};
pub use self::profile::Profile;
pub use self::thing::Thing;

/// JSON object persisted in `metadata` and `config` columns.
pub use pagination::Metadata;
