//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use futures_util::FutureExt;
use pagination::{Page, PageRequest};
use serde_json::Value;

use crate::domain::Profile;
use crate::domain::ports::{ListScope, ProfileRepository, RepositoryError};

use super::batch::{BatchError, run_batch};
use super::error_mapping::{
    Operation, map_diesel_error, map_pool_error, parse_id, parse_ids, parse_reference,
};
use super::listing::fetch_page;
use super::models::{NewProfileRow, ProfileRow, ProfileUpdate, non_empty};
use super::pool::DbPool;
use super::query_builder::{
    Bind, ListTable, Predicate, ScopeTarget, build_filters, scope_predicate,
};
use super::schema::{profiles, things};

const PROFILES: ListTable = ListTable {
    table: "profiles",
    columns: "id, group_id, name, config, metadata",
    id_column: "id",
    name_column: "name",
    metadata_column: Some("metadata"),
};

/// Diesel-backed implementation of the profile repository port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_new_row(profile: &Profile) -> Result<NewProfileRow, RepositoryError> {
    Ok(NewProfileRow {
        id: parse_id(&profile.id, "profile", Operation::Create)?,
        group_id: parse_reference(&profile.group_id, "group")?,
        name: profile.name.clone(),
        config: Value::Object(profile.config.clone()),
        metadata: Value::Object(profile.metadata.clone()),
    })
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn save(&self, records: &[Profile]) -> Result<Vec<Profile>, RepositoryError> {
        let rows = records
            .iter()
            .map(to_new_row)
            .collect::<Result<Vec<_>, _>>()?;

        let stored = run_batch(&self.pool, Operation::Create, &rows, |conn, row| {
            async move {
                diesel::insert_into(profiles::table)
                    .values(row)
                    .returning(ProfileRow::as_returning())
                    .get_result::<ProfileRow>(conn)
                    .await
                    .map_err(BatchError::from)
            }
            .boxed()
        })
        .await?;

        Ok(stored.into_iter().map(Profile::from).collect())
    }

    async fn update(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let id = parse_id(&profile.id, "profile", Operation::Update)?;
        let group_id = parse_id(&profile.group_id, "group", Operation::Update)?;
        let changes = ProfileUpdate {
            name: non_empty(&profile.name),
            config: Value::Object(profile.config.clone()),
            metadata: Value::Object(profile.metadata.clone()),
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Update))?;

        diesel::update(
            profiles::table
                .filter(profiles::id.eq(id))
                .filter(profiles::group_id.eq(group_id)),
        )
        .set(&changes)
        .returning(ProfileRow::as_returning())
        .get_result::<ProfileRow>(&mut conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, Operation::Update))?
        .map(Profile::from)
        .ok_or_else(|| RepositoryError::not_found(format!("profile {}", profile.id)))
    }

    async fn retrieve_by_id(&self, id: &str) -> Result<Profile, RepositoryError> {
        let profile_id = parse_id(id, "profile", Operation::Retrieve)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        profiles::table
            .find(profile_id)
            .select(ProfileRow::as_select())
            .first::<ProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))?
            .map(Profile::from)
            .ok_or_else(|| RepositoryError::not_found(format!("profile {id}")))
    }

    async fn retrieve_by_thing(&self, thing_id: &str) -> Result<Profile, RepositoryError> {
        let thing = parse_id(thing_id, "thing", Operation::Retrieve)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        things::table
            .inner_join(profiles::table)
            .filter(things::id.eq(thing))
            .select(ProfileRow::as_select())
            .first::<ProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))?
            .map(Profile::from)
            .ok_or_else(|| RepositoryError::not_found(format!("profile of thing {thing_id}")))
    }

    async fn retrieve_by_filter(
        &self,
        scope: &ListScope,
        request: &PageRequest,
    ) -> Result<Page<Profile>, RepositoryError> {
        let mut predicates: Vec<_> = scope_predicate(scope, ScopeTarget::OwnedBy("group_id"))
            .into_iter()
            .collect();
        predicates.extend(build_filters(&PROFILES, request)?);
        fetch_page::<ProfileRow, Profile>(&self.pool, &PROFILES, predicates, request).await
    }

    async fn retrieve_by_group(
        &self,
        group_id: &str,
        request: &PageRequest,
    ) -> Result<Page<Profile>, RepositoryError> {
        let group = parse_id(group_id, "group", Operation::Retrieve)?;
        let mut predicates = vec![Predicate::Equals {
            column: "group_id",
            value: Bind::Uuid(group),
        }];
        predicates.extend(build_filters(&PROFILES, request)?);
        fetch_page::<ProfileRow, Profile>(&self.pool, &PROFILES, predicates, request).await
    }

    async fn remove(&self, ids: &[String]) -> Result<(), RepositoryError> {
        let profile_ids = parse_ids(ids);
        if profile_ids.is_empty() {
            return Ok(());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Remove))?;

        diesel::delete(profiles::table.filter(profiles::id.eq_any(profile_ids)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Operation::Remove))?;
        Ok(())
    }
}
