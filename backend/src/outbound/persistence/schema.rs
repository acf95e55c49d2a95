//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the embedded migrations exactly. The
//! per-group role, policy and membership tables are addressed through raw SQL
//! parameterised by table name and are therefore not declared here.

diesel::table! {
    /// Tenant-scoped groups. `(org_id, name)` is unique.
    groups (id) {
        id -> Uuid,
        org_id -> Uuid,
        name -> Varchar,
        description -> Varchar,
        metadata -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Configuration profiles. Cascades from `groups`; `(group_id, name)` is
    /// unique.
    profiles (id) {
        id -> Uuid,
        group_id -> Uuid,
        name -> Varchar,
        config -> Jsonb,
        metadata -> Jsonb,
    }
}

diesel::table! {
    /// Things. Cascades from `groups`; `profile_id` blocks profile removal.
    /// `key` is globally unique and `(group_id, name)` is unique.
    things (id) {
        id -> Uuid,
        group_id -> Uuid,
        profile_id -> Uuid,
        key -> Varchar,
        name -> Varchar,
        metadata -> Jsonb,
    }
}

diesel::table! {
    /// Channel-to-thing links. Cascades from both endpoints.
    connections (channel_id, thing_id) {
        channel_id -> Uuid,
        thing_id -> Uuid,
    }
}

diesel::joinable!(profiles -> groups (group_id));
diesel::joinable!(things -> profiles (profile_id));
diesel::joinable!(connections -> things (thing_id));

diesel::allow_tables_to_appear_in_same_query!(groups, profiles, things, connections);
