//! Per-group role, policy and membership records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which per-group association table a [`GroupMember`] lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberTable {
    /// Roles granted to members of a group.
    Roles,
    /// Policies attached to members of a group.
    Policies,
    /// Plain group memberships with a membership label.
    Memberships,
}

impl MemberTable {
    /// Every member table, in schema order.
    pub const ALL: [Self; 3] = [Self::Roles, Self::Policies, Self::Memberships];

    /// Human-readable record kind used in error messages.
    pub fn record_kind(self) -> &'static str {
        match self {
            Self::Roles => "group role",
            Self::Policies => "group policy",
            Self::Memberships => "group membership",
        }
    }
}

impl fmt::Display for MemberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_kind())
    }
}

/// Ternary association granting `member_id` a role or policy within a group.
///
/// `(group_id, member_id)` is unique per table: a member holds at most one
/// role, one policy and one membership per group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub group_id: String,
    pub member_id: String,
    /// Role, policy or membership label, depending on the table.
    pub role: String,
}

impl GroupMember {
    /// Build a member record.
    pub fn new(
        group_id: impl Into<String>,
        member_id: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            member_id: member_id.into(),
            role: role.into(),
        }
    }
}
