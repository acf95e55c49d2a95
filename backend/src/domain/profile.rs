//! Profile records: named configuration templates referenced by things.

use serde::{Deserialize, Serialize};

use super::Metadata;

/// Configuration template owned by exactly one group.
///
/// ## Invariants
/// - `name` is unique within `group_id`.
/// - A profile cannot be removed while any thing references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub group_id: String,
    pub name: String,
    /// Opaque configuration document.
    #[serde(default)]
    pub config: Metadata,
    #[serde(default)]
    pub metadata: Metadata,
}
