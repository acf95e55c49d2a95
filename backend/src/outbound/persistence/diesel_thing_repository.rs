//! PostgreSQL-backed `ThingRepository` implementation using Diesel ORM.
//!
//! Things reference their profile without cascade, so a profile cannot be
//! removed while any thing is built from it. Keys are globally unique and
//! rotate through [`ThingRepository::update_key`] only.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use futures_util::FutureExt;
use pagination::{Page, PageRequest};
use serde_json::Value;

use crate::domain::Thing;
use crate::domain::ports::{ListScope, RepositoryError, ThingRepository};

use super::batch::{BatchError, run_batch};
use super::error_mapping::{
    Operation, map_diesel_error, map_pool_error, parse_id, parse_ids, parse_reference,
};
use super::listing::fetch_page;
use super::models::{NewThingRow, ThingRow, ThingUpdate, non_empty};
use super::pool::DbPool;
use super::query_builder::{
    Bind, ListTable, Predicate, ScopeTarget, build_filters, scope_predicate,
};
use super::schema::things;

const THINGS: ListTable = ListTable {
    table: "things",
    columns: "id, group_id, profile_id, key, name, metadata",
    id_column: "id",
    name_column: "name",
    metadata_column: Some("metadata"),
};

const CONNECTED_TO_CHANNEL: &str = "SELECT thing_id FROM connections WHERE channel_id =";

/// Diesel-backed implementation of the thing repository port.
#[derive(Clone)]
pub struct DieselThingRepository {
    pool: DbPool,
}

impl DieselThingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn page(
        &self,
        mut predicates: Vec<Predicate>,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError> {
        predicates.extend(build_filters(&THINGS, request)?);
        fetch_page::<ThingRow, Thing>(&self.pool, &THINGS, predicates, request).await
    }
}

fn to_new_row(thing: &Thing) -> Result<NewThingRow, RepositoryError> {
    Ok(NewThingRow {
        id: parse_id(&thing.id, "thing", Operation::Create)?,
        group_id: parse_reference(&thing.group_id, "group")?,
        profile_id: parse_reference(&thing.profile_id, "profile")?,
        key: thing.key.clone(),
        name: thing.name.clone(),
        metadata: Value::Object(thing.metadata.clone()),
    })
}

fn owned_by(column: &'static str, id: uuid::Uuid) -> Predicate {
    Predicate::Equals {
        column,
        value: Bind::Uuid(id),
    }
}

#[async_trait]
impl ThingRepository for DieselThingRepository {
    async fn save(&self, records: &[Thing]) -> Result<Vec<Thing>, RepositoryError> {
        let rows = records
            .iter()
            .map(to_new_row)
            .collect::<Result<Vec<_>, _>>()?;

        let stored = run_batch(&self.pool, Operation::Create, &rows, |conn, row| {
            async move {
                diesel::insert_into(things::table)
                    .values(row)
                    .returning(ThingRow::as_returning())
                    .get_result::<ThingRow>(conn)
                    .await
                    .map_err(BatchError::from)
            }
            .boxed()
        })
        .await?;

        Ok(stored.into_iter().map(Thing::from).collect())
    }

    async fn update(&self, thing: &Thing) -> Result<Thing, RepositoryError> {
        let id = parse_id(&thing.id, "thing", Operation::Update)?;
        let group_id = parse_id(&thing.group_id, "group", Operation::Update)?;
        let changes = ThingUpdate {
            name: non_empty(&thing.name),
            metadata: Value::Object(thing.metadata.clone()),
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Update))?;

        diesel::update(
            things::table
                .filter(things::id.eq(id))
                .filter(things::group_id.eq(group_id)),
        )
        .set(&changes)
        .returning(ThingRow::as_returning())
        .get_result::<ThingRow>(&mut conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, Operation::Update))?
        .map(Thing::from)
        .ok_or_else(|| RepositoryError::not_found(format!("thing {}", thing.id)))
    }

    async fn update_key(&self, id: &str, key: &str) -> Result<(), RepositoryError> {
        let thing_id = parse_id(id, "thing", Operation::Update)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Update))?;

        let updated = diesel::update(things::table.find(thing_id))
            .set(things::key.eq(key))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Operation::Update))?;

        if updated == 0 {
            return Err(RepositoryError::not_found(format!("thing {id}")));
        }
        Ok(())
    }

    async fn retrieve_by_id(&self, id: &str) -> Result<Thing, RepositoryError> {
        let thing_id = parse_id(id, "thing", Operation::Retrieve)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        things::table
            .find(thing_id)
            .select(ThingRow::as_select())
            .first::<ThingRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))?
            .map(Thing::from)
            .ok_or_else(|| RepositoryError::not_found(format!("thing {id}")))
    }

    async fn retrieve_by_key(&self, key: &str) -> Result<Thing, RepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        things::table
            .filter(things::key.eq(key))
            .select(ThingRow::as_select())
            .first::<ThingRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))?
            .map(Thing::from)
            .ok_or_else(|| RepositoryError::not_found("thing with the given key"))
    }

    async fn retrieve_by_filter(
        &self,
        scope: &ListScope,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError> {
        let predicates = scope_predicate(scope, ScopeTarget::OwnedBy("group_id"))
            .into_iter()
            .collect();
        self.page(predicates, request).await
    }

    async fn retrieve_by_group(
        &self,
        group_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError> {
        let group = parse_id(group_id, "group", Operation::Retrieve)?;
        self.page(vec![owned_by("group_id", group)], request).await
    }

    async fn retrieve_by_profile(
        &self,
        profile_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError> {
        let profile = parse_id(profile_id, "profile", Operation::Retrieve)?;
        self.page(vec![owned_by("profile_id", profile)], request).await
    }

    async fn retrieve_by_channel(
        &self,
        channel_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Thing>, RepositoryError> {
        let channel = parse_id(channel_id, "channel", Operation::Retrieve)?;
        let connected = Predicate::InSubquery {
            column: "id",
            select: CONNECTED_TO_CHANNEL,
            value: Bind::Uuid(channel),
        };
        self.page(vec![connected], request).await
    }

    async fn remove(&self, ids: &[String]) -> Result<(), RepositoryError> {
        let thing_ids = parse_ids(ids);
        if thing_ids.is_empty() {
            return Ok(());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Remove))?;

        diesel::delete(things::table.filter(things::id.eq_any(thing_ids)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Operation::Remove))?;
        Ok(())
    }
}
