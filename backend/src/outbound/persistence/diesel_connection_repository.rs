//! PostgreSQL-backed `ConnectionRepository` implementation using Diesel ORM.
//!
//! Connect and disconnect run as batches: every pairing in the request
//! succeeds or none does.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use futures_util::FutureExt;
use uuid::Uuid;

use crate::domain::Connection;
use crate::domain::ports::{ConnectionRepository, RepositoryError};

use super::batch::{BatchError, run_batch};
use super::error_mapping::{Operation, map_diesel_error, map_pool_error, parse_id, parse_reference};
use super::models::ConnectionRow;
use super::pool::DbPool;
use super::schema::connections;

/// Diesel-backed implementation of the connection repository port.
#[derive(Clone)]
pub struct DieselConnectionRepository {
    pool: DbPool,
}

impl DieselConnectionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Pair the channel with every thing, failing on the first bad id.
fn pairings(channel_id: &str, thing_ids: &[String]) -> Result<Vec<ConnectionRow>, RepositoryError> {
    let channel_id = parse_reference(channel_id, "channel")?;
    thing_ids
        .iter()
        .map(|thing_id| {
            Ok(ConnectionRow {
                channel_id,
                thing_id: parse_reference(thing_id, "thing")?,
            })
        })
        .collect()
}

#[async_trait]
impl ConnectionRepository for DieselConnectionRepository {
    async fn connect(
        &self,
        channel_id: &str,
        thing_ids: &[String],
    ) -> Result<Vec<Connection>, RepositoryError> {
        let rows = pairings(channel_id, thing_ids)?;

        let stored = run_batch(&self.pool, Operation::Create, &rows, |conn, row| {
            async move {
                diesel::insert_into(connections::table)
                    .values(row)
                    .returning(ConnectionRow::as_returning())
                    .get_result::<ConnectionRow>(conn)
                    .await
                    .map_err(BatchError::from)
            }
            .boxed()
        })
        .await?;

        Ok(stored.into_iter().map(Connection::from).collect())
    }

    async fn disconnect(
        &self,
        channel_id: &str,
        thing_ids: &[String],
    ) -> Result<(), RepositoryError> {
        let rows = pairings(channel_id, thing_ids)?;

        run_batch(&self.pool, Operation::Remove, &rows, |conn, row| {
            async move {
                let removed = diesel::delete(connections::table.find((row.channel_id, row.thing_id)))
                    .execute(conn)
                    .await?;
                if removed == 0 {
                    return Err(BatchError::Rejected(RepositoryError::not_found(format!(
                        "connection {} -> {}",
                        row.channel_id, row.thing_id
                    ))));
                }
                Ok(())
            }
            .boxed()
        })
        .await?;
        Ok(())
    }

    async fn has_connection(
        &self,
        channel_id: &str,
        thing_id: &str,
    ) -> Result<bool, RepositoryError> {
        let (Ok(channel), Ok(thing)) = (Uuid::parse_str(channel_id), Uuid::parse_str(thing_id))
        else {
            return Ok(false);
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        diesel::select(diesel::dsl::exists(connections::table.find((channel, thing))))
            .get_result::<bool>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))
    }

    async fn retrieve_by_thing(
        &self,
        thing_id: &str,
    ) -> Result<Vec<Connection>, RepositoryError> {
        let thing = parse_id(thing_id, "thing", Operation::Retrieve)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        let rows: Vec<ConnectionRow> = connections::table
            .filter(connections::thing_id.eq(thing))
            .order(connections::channel_id.asc())
            .select(ConnectionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))?;

        Ok(rows.into_iter().map(Connection::from).collect())
    }
}
