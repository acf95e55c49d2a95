//! Apply the embedded schema migrations to the configured database.
//!
//! Connection settings come from `THINGS_DB_*` variables, configuration
//! files or flags; see [`PersistenceSettings`].
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use things_store::config::PersistenceSettings;
use things_store::outbound::persistence::run_pending_migrations;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = PersistenceSettings::load().wrap_err("failed to load persistence settings")?;
    let applied = run_pending_migrations(&settings.database_url)
        .wrap_err("failed to migrate the things schema")?;

    if applied.is_empty() {
        info!("schema already up to date");
    }
    for version in applied {
        info!(%version, "migration applied");
    }
    Ok(())
}
