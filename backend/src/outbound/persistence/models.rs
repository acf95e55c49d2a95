//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain records live here
//! so every repository renders ids and JSON documents the same way.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text, Uuid as SqlUuid};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Connection, Group, GroupMember, Metadata, Profile, Thing};

use super::schema::{connections, groups, profiles, things};

/// Unwrap a stored JSON document into an object map.
///
/// Columns are constrained to objects by the write path; anything else reads
/// back as an empty map.
pub(crate) fn into_metadata(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

/// `None` for an empty display field so the changeset leaves it untouched.
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|value| !value.is_empty())
}

// ---------------------------------------------------------------------------
// Group models
// ---------------------------------------------------------------------------

/// Row struct for reading from the groups table.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id.to_string(),
            org_id: row.org_id.to_string(),
            name: row.name,
            description: row.description,
            metadata: into_metadata(row.metadata),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating group records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = groups)]
pub(crate) struct NewGroupRow {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for group updates. `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = groups)]
pub(crate) struct GroupUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub metadata: Value,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Profile models
// ---------------------------------------------------------------------------

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub config: Value,
    pub metadata: Value,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id.to_string(),
            group_id: row.group_id.to_string(),
            name: row.name,
            config: into_metadata(row.config),
            metadata: into_metadata(row.metadata),
        }
    }
}

/// Insertable struct for creating profile records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub config: Value,
    pub metadata: Value,
}

/// Changeset for profile updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
pub(crate) struct ProfileUpdate<'a> {
    pub name: Option<&'a str>,
    pub config: Value,
    pub metadata: Value,
}

// ---------------------------------------------------------------------------
// Thing models
// ---------------------------------------------------------------------------

/// Row struct for reading from the things table.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = things)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ThingRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub profile_id: Uuid,
    pub key: String,
    pub name: String,
    pub metadata: Value,
}

impl From<ThingRow> for Thing {
    fn from(row: ThingRow) -> Self {
        Self {
            id: row.id.to_string(),
            group_id: row.group_id.to_string(),
            profile_id: row.profile_id.to_string(),
            name: row.name,
            key: row.key,
            metadata: into_metadata(row.metadata),
        }
    }
}

/// Insertable struct for creating thing records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = things)]
pub(crate) struct NewThingRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub profile_id: Uuid,
    pub key: String,
    pub name: String,
    pub metadata: Value,
}

/// Changeset for thing updates. The key rotates through its own statement.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = things)]
pub(crate) struct ThingUpdate<'a> {
    pub name: Option<&'a str>,
    pub metadata: Value,
}

// ---------------------------------------------------------------------------
// Connection models
// ---------------------------------------------------------------------------

/// Row struct for the connections table; also its insertable form.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = connections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConnectionRow {
    pub channel_id: Uuid,
    pub thing_id: Uuid,
}

impl From<ConnectionRow> for Connection {
    fn from(row: ConnectionRow) -> Self {
        Self::new(row.channel_id.to_string(), row.thing_id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Raw query rows
// ---------------------------------------------------------------------------

/// Member row read through raw SQL.
///
/// The value column is aliased to `role` because the policy table names it
/// `policy`.
#[derive(Debug, Clone, QueryableByName)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberRow {
    #[diesel(sql_type = SqlUuid)]
    pub group_id: Uuid,
    #[diesel(sql_type = Text)]
    pub member_id: String,
    #[diesel(sql_type = Text)]
    pub role: String,
}

impl From<MemberRow> for GroupMember {
    fn from(row: MemberRow) -> Self {
        Self::new(row.group_id.to_string(), row.member_id, row.role)
    }
}

/// Result of a `SELECT COUNT(*) AS total` statement.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
}
