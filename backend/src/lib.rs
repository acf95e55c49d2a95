//! Multi-tenant persistence for groups, profiles, things, connections and
//! per-group member records.
//!
//! The [`domain`] module holds the records and repository ports; the
//! [`outbound::persistence`] module implements those ports on PostgreSQL.

pub mod config;
pub mod domain;
pub mod outbound;
