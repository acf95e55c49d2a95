//! All-or-nothing execution of one statement per input item.
//!
//! [`run_batch`] checks out a single connection, opens a transaction and runs
//! the statement for each item in order. The first failure rolls the whole
//! batch back and is reported once, translated with the batch's operation.

use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures_util::future::BoxFuture;
use tracing::debug;

use crate::domain::ports::RepositoryError;

use super::error_mapping::{Operation, map_diesel_error, map_pool_error};
use super::pool::DbPool;

/// Failure of one batch statement.
#[derive(Debug)]
pub(crate) enum BatchError {
    /// The database rejected the statement.
    Database(diesel::result::Error),
    /// The statement ran but its outcome violates the batch contract, such
    /// as a delete that matched no row.
    Rejected(RepositoryError),
}

impl From<diesel::result::Error> for BatchError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl BatchError {
    fn into_repository_error(self, operation: Operation) -> RepositoryError {
        match self {
            Self::Database(error) => map_diesel_error(error, operation),
            Self::Rejected(error) => error,
        }
    }
}

/// Run `statement` once per item inside one transaction.
///
/// Returns the statement outputs in input order. Empty input succeeds
/// without checking out a connection.
pub(crate) async fn run_batch<T, R, F>(
    pool: &DbPool,
    operation: Operation,
    items: &[T],
    statement: F,
) -> Result<Vec<R>, RepositoryError>
where
    T: Sync,
    R: Send,
    F: for<'c> Fn(&'c mut AsyncPgConnection, &'c T) -> BoxFuture<'c, Result<R, BatchError>>
        + Send
        + Sync,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut conn = pool
        .get()
        .await
        .map_err(|err| map_pool_error(err, operation))?;
    let statement = &statement;

    conn.transaction::<_, BatchError, _>(|conn| {
        async move {
            let mut outputs = Vec::with_capacity(items.len());
            for item in items {
                outputs.push(statement(conn, item).await?);
            }
            Ok(outputs)
        }
        .scope_boxed()
    })
    .await
    .map_err(|err| {
        debug!(?operation, size = items.len(), error = ?err, "batch rolled back");
        err.into_repository_error(operation)
    })
}
