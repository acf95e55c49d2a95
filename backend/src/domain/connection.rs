//! Connection records linking things to routing targets.

use serde::{Deserialize, Serialize};

/// Many-to-many link between a channel and a thing.
///
/// The channel is the routing target; in this schema it is a profile row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub channel_id: String,
    pub thing_id: String,
}

impl Connection {
    /// Pair `channel_id` with `thing_id`.
    pub fn new(channel_id: impl Into<String>, thing_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            thing_id: thing_id.into(),
        }
    }
}
