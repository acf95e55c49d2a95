//! Privilege-dropping helper for the embedded PostgreSQL test cluster.
//!
//! `pg_embedded_setup_unpriv` runs this binary as an unprivileged user when
//! the repository integration tests execute as root. Usage:
//! `pg_worker <setup|start|stop> <payload.json>`, where the payload is a
//! serialised [`pg_embedded_setup_unpriv::worker::WorkerPayload`].

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Report, Result, bail, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let invocation = Invocation::from_args(env::args_os())?;
    invocation.run()
}

/// Parsed command line: what to do and where the payload lives.
#[derive(Debug)]
struct Invocation {
    action: Action,
    payload_path: PathBuf,
}

impl Invocation {
    fn from_args(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut args = args.into_iter().skip(1);
        let action = args
            .next()
            .ok_or_else(|| eyre!("missing operation argument"))
            .and_then(|raw| Action::parse(&raw.to_string_lossy()))?;
        let payload_path = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| eyre!("missing config path argument"))?;
        if let Some(extra) = args.next() {
            bail!(
                "unexpected extra argument: {}; expected only operation and config path",
                extra.to_string_lossy()
            );
        }
        Ok(Self {
            action,
            payload_path,
        })
    }

    fn run(self) -> Result<()> {
        let payload = read_payload(&self.payload_path)?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| Report::new(err).wrap_err("failed to rebuild postgres settings"))?;
        export_environment(
            payload
                .environment
                .into_iter()
                .map(|(key, value)| (key, value.map(|secret| secret.expose().to_owned())))
                .collect(),
        );

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .wrap_err("failed to build pg_worker runtime")?;
        let mut postgres = PostgreSQL::new(settings);
        let action = self.action;
        runtime
            .block_on(async move {
                match action {
                    Action::Setup => postgres.setup().await,
                    Action::Start => postgres.start().await,
                    Action::Stop => postgres.stop().await,
                }
            })
            .with_context(|| format!("postgresql_embedded {action} failed"))
    }
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = fs::read(path).with_context(|| format!("failed to read worker config at {path:?}"))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse worker config at {path:?}"))
}

fn export_environment(variables: Vec<(String, Option<String>)>) {
    for (key, value) in variables {
        // SAFETY: the worker is single-threaded until the runtime is built.
        match value {
            Some(value) => unsafe { env::set_var(&key, value) },
            None => unsafe { env::remove_var(&key) },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Setup,
    Start,
    Stop,
}

impl Action {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!(
                "unknown pg_worker operation '{other}'; valid operations are setup, start, and stop"
            )),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}
