//! PostgreSQL-backed `GroupRepository` implementation using Diesel ORM.
//!
//! Removing a group relies on `ON DELETE CASCADE` to take its profiles,
//! things, connections and member records with it in one statement.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use futures_util::FutureExt;
use pagination::{Page, PageRequest};
use serde_json::Value;

use crate::domain::Group;
use crate::domain::ports::{GroupRepository, ListScope, RepositoryError};

use super::batch::{BatchError, run_batch};
use super::error_mapping::{Operation, map_diesel_error, map_pool_error, parse_id, parse_ids};
use super::listing::fetch_page;
use super::models::{GroupRow, GroupUpdate, NewGroupRow, non_empty};
use super::pool::DbPool;
use super::query_builder::{ListTable, ScopeTarget, build_filters, scope_predicate};
use super::schema::groups;

const GROUPS: ListTable = ListTable {
    table: "groups",
    columns: "id, org_id, name, description, metadata, created_at, updated_at",
    id_column: "id",
    name_column: "name",
    metadata_column: Some("metadata"),
};

/// Diesel-backed implementation of the group repository port.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_new_row(group: &Group) -> Result<NewGroupRow, RepositoryError> {
    Ok(NewGroupRow {
        id: parse_id(&group.id, "group", Operation::Create)?,
        org_id: parse_id(&group.org_id, "organization", Operation::Create)?,
        name: group.name.clone(),
        description: group.description.clone(),
        metadata: Value::Object(group.metadata.clone()),
        created_at: group.created_at,
        updated_at: group.updated_at,
    })
}

fn to_update(group: &Group) -> GroupUpdate<'_> {
    GroupUpdate {
        name: non_empty(&group.name),
        description: non_empty(&group.description),
        metadata: Value::Object(group.metadata.clone()),
        updated_at: group.updated_at,
    }
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn save(&self, records: &[Group]) -> Result<Vec<Group>, RepositoryError> {
        let rows = records
            .iter()
            .map(to_new_row)
            .collect::<Result<Vec<_>, _>>()?;

        let stored = run_batch(&self.pool, Operation::Create, &rows, |conn, row| {
            async move {
                diesel::insert_into(groups::table)
                    .values(row)
                    .returning(GroupRow::as_returning())
                    .get_result::<GroupRow>(conn)
                    .await
                    .map_err(BatchError::from)
            }
            .boxed()
        })
        .await?;

        Ok(stored.into_iter().map(Group::from).collect())
    }

    async fn update(&self, group: &Group) -> Result<Group, RepositoryError> {
        let id = parse_id(&group.id, "group", Operation::Update)?;
        let changes = to_update(group);
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Update))?;

        diesel::update(groups::table.find(id))
            .set(&changes)
            .returning(GroupRow::as_returning())
            .get_result::<GroupRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Operation::Update))?
            .map(Group::from)
            .ok_or_else(|| RepositoryError::not_found(format!("group {}", group.id)))
    }

    async fn retrieve_by_id(&self, id: &str) -> Result<Group, RepositoryError> {
        let group_id = parse_id(id, "group", Operation::Retrieve)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        groups::table
            .find(group_id)
            .select(GroupRow::as_select())
            .first::<GroupRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))?
            .map(Group::from)
            .ok_or_else(|| RepositoryError::not_found(format!("group {id}")))
    }

    async fn retrieve_by_ids(&self, ids: &[String]) -> Result<Vec<Group>, RepositoryError> {
        let group_ids = parse_ids(ids);
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        let rows: Vec<GroupRow> = groups::table
            .filter(groups::id.eq_any(group_ids))
            .order(groups::id.asc())
            .select(GroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    async fn retrieve_by_filter(
        &self,
        scope: &ListScope,
        request: &PageRequest,
    ) -> Result<Page<Group>, RepositoryError> {
        let mut predicates: Vec<_> = scope_predicate(scope, ScopeTarget::Groups)
            .into_iter()
            .collect();
        predicates.extend(build_filters(&GROUPS, request)?);
        fetch_page::<GroupRow, Group>(&self.pool, &GROUPS, predicates, request).await
    }

    async fn remove(&self, ids: &[String]) -> Result<(), RepositoryError> {
        let group_ids = parse_ids(ids);
        if group_ids.is_empty() {
            return Ok(());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Remove))?;

        diesel::delete(groups::table.filter(groups::id.eq_any(group_ids)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Operation::Remove))?;
        Ok(())
    }
}
