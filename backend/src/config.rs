//! Persistence configuration loaded via OrthoConfig.
//!
//! Values come from `THINGS_DB_*` environment variables, configuration files
//! and command-line flags, in OrthoConfig's usual precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

/// Connection settings for the PostgreSQL store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "THINGS_DB")]
pub struct PersistenceSettings {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Upper bound on pooled connections.
    #[ortho_config(default = 10)]
    pub max_connections: u32,
    /// Connections kept open while idle.
    #[ortho_config(default = 2)]
    pub min_idle: u32,
    /// Seconds to wait for a pooled connection before failing.
    #[ortho_config(default = 30)]
    pub connection_timeout_secs: u64,
}

impl PersistenceSettings {
    /// Pool configuration described by these settings.
    pub fn to_pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.database_url.as_str())
            .with_max_size(self.max_connections)
            .with_min_idle(Some(self.min_idle))
            .with_connection_timeout(Duration::from_secs(self.connection_timeout_secs))
    }
}
