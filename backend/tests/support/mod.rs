//! Shared helpers for repository integration tests.
//!
//! Each file under `backend/tests/` compiles as its own crate and pulls this
//! module in with `mod support;`, so not every helper is used by every suite.
#![allow(dead_code)]

pub mod cluster;
mod cluster_skip;
mod embedded_postgres;
pub mod fixtures;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::provision_template_database;

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// `postgres::Error`'s `Display` collapses database errors to `db error`;
/// the SQLSTATE, message and detail are pulled out when available.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }
    summary
}
