//! Thing records: managed device instances.

use serde::{Deserialize, Serialize};

use super::Metadata;

/// A device or resource instance belonging to a group and a profile.
///
/// ## Invariants
/// - `key` is globally unique and may be rotated on its own.
/// - `name` is unique within `group_id`.
/// - `profile_id` and `group_id` reference existing rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    pub id: String,
    pub group_id: String,
    pub profile_id: String,
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub metadata: Metadata,
}
