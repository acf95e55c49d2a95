//! PostgreSQL-backed `GroupMemberRepository` for the per-group role, policy
//! and membership tables.
//!
//! The three tables share a shape and differ only in their names, so one
//! adapter serves all of them through raw SQL with whitelisted identifiers.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel_async::RunQueryDsl;
use futures_util::FutureExt;
use pagination::{Page, PageRequest};

use crate::domain::ports::{GroupMemberRepository, RepositoryError};
use crate::domain::{GroupMember, MemberTable};

use super::batch::{BatchError, run_batch};
use super::error_mapping::{Operation, map_diesel_error, map_pool_error, parse_id, parse_reference};
use super::listing::{fetch_page, raw_query};
use super::models::MemberRow;
use super::pool::DbPool;
use super::query_builder::{Bind, ListTable, Predicate, build_filters};

const ROLES: ListTable = ListTable {
    table: "group_roles",
    columns: "group_id, member_id, role",
    id_column: "member_id",
    name_column: "member_id",
    metadata_column: None,
};

const POLICIES: ListTable = ListTable {
    table: "group_policies",
    columns: "group_id, member_id, policy AS role",
    id_column: "member_id",
    name_column: "member_id",
    metadata_column: None,
};

const MEMBERSHIPS: ListTable = ListTable {
    table: "group_memberships",
    columns: "group_id, member_id, role",
    id_column: "member_id",
    name_column: "member_id",
    metadata_column: None,
};

fn list_table(table: MemberTable) -> &'static ListTable {
    match table {
        MemberTable::Roles => &ROLES,
        MemberTable::Policies => &POLICIES,
        MemberTable::Memberships => &MEMBERSHIPS,
    }
}

fn value_column(table: MemberTable) -> &'static str {
    match table {
        MemberTable::Roles | MemberTable::Memberships => "role",
        MemberTable::Policies => "policy",
    }
}

/// Statements for one member table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MemberSql {
    insert: String,
    update: String,
    select_one: String,
    delete_one: String,
}

impl MemberSql {
    fn for_table(table: MemberTable) -> Self {
        let ListTable { table: name, columns, .. } = *list_table(table);
        let value = value_column(table);
        Self {
            insert: format!(
                "INSERT INTO {name} (group_id, member_id, {value}) VALUES ($1, $2, $3) \
                 RETURNING {columns}"
            ),
            update: format!(
                "UPDATE {name} SET {value} = $1 WHERE group_id = $2 AND member_id = $3 \
                 RETURNING {columns}"
            ),
            select_one: format!(
                "SELECT {columns} FROM {name} WHERE group_id = $1 AND member_id = $2"
            ),
            delete_one: format!("DELETE FROM {name} WHERE group_id = $1 AND member_id = $2"),
        }
    }
}

/// Diesel-backed implementation of the group member repository port.
///
/// One instance serves one [`MemberTable`].
#[derive(Clone)]
pub struct DieselGroupMemberRepository {
    pool: DbPool,
    table: MemberTable,
}

impl DieselGroupMemberRepository {
    /// Create a repository for `table` with the given connection pool.
    pub fn new(pool: DbPool, table: MemberTable) -> Self {
        Self { pool, table }
    }

    /// Repository for group roles.
    pub fn roles(pool: DbPool) -> Self {
        Self::new(pool, MemberTable::Roles)
    }

    /// Repository for group policies.
    pub fn policies(pool: DbPool) -> Self {
        Self::new(pool, MemberTable::Policies)
    }

    /// Repository for group memberships.
    pub fn memberships(pool: DbPool) -> Self {
        Self::new(pool, MemberTable::Memberships)
    }

    fn sql(&self) -> MemberSql {
        MemberSql::for_table(self.table)
    }

    fn missing(&self, group_id: &str, member_id: &str) -> RepositoryError {
        RepositoryError::not_found(format!(
            "{} of {member_id} in group {group_id}",
            self.table
        ))
    }
}

fn to_row(member: &GroupMember) -> Result<MemberRow, RepositoryError> {
    Ok(MemberRow {
        group_id: parse_reference(&member.group_id, "group")?,
        member_id: member.member_id.clone(),
        role: member.role.clone(),
    })
}

#[async_trait]
impl GroupMemberRepository for DieselGroupMemberRepository {
    fn table(&self) -> MemberTable {
        self.table
    }

    async fn save(&self, members: &[GroupMember]) -> Result<Vec<GroupMember>, RepositoryError> {
        let rows = members
            .iter()
            .map(to_row)
            .collect::<Result<Vec<_>, _>>()?;
        let insert = self.sql().insert;

        let stored = run_batch(&self.pool, Operation::Create, &rows, |conn, row| {
            let query = raw_query(
                insert.clone(),
                vec![
                    Bind::Uuid(row.group_id),
                    Bind::Text(row.member_id.clone()),
                    Bind::Text(row.role.clone()),
                ],
            );
            async move {
                query
                    .get_result::<MemberRow>(conn)
                    .await
                    .map_err(BatchError::from)
            }
            .boxed()
        })
        .await?;

        Ok(stored.into_iter().map(GroupMember::from).collect())
    }

    async fn update(&self, member: &GroupMember) -> Result<GroupMember, RepositoryError> {
        let group_id = parse_id(&member.group_id, "group", Operation::Update)?;
        let query = raw_query(
            self.sql().update,
            vec![
                Bind::Text(member.role.clone()),
                Bind::Uuid(group_id),
                Bind::Text(member.member_id.clone()),
            ],
        );
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Update))?;

        query
            .get_result::<MemberRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Operation::Update))?
            .map(GroupMember::from)
            .ok_or_else(|| self.missing(&member.group_id, &member.member_id))
    }

    async fn retrieve(
        &self,
        group_id: &str,
        member_id: &str,
    ) -> Result<GroupMember, RepositoryError> {
        let group = parse_id(group_id, "group", Operation::Retrieve)?;
        let query = raw_query(
            self.sql().select_one,
            vec![Bind::Uuid(group), Bind::Text(member_id.to_owned())],
        );
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

        query
            .get_result::<MemberRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Operation::Retrieve))?
            .map(GroupMember::from)
            .ok_or_else(|| self.missing(group_id, member_id))
    }

    async fn retrieve_by_group(
        &self,
        group_id: &str,
        request: &PageRequest,
    ) -> Result<Page<GroupMember>, RepositoryError> {
        let group = parse_id(group_id, "group", Operation::Retrieve)?;
        let table = list_table(self.table);
        let mut predicates = vec![Predicate::Equals {
            column: "group_id",
            value: Bind::Uuid(group),
        }];
        predicates.extend(build_filters(table, request)?);
        fetch_page::<MemberRow, GroupMember>(&self.pool, table, predicates, request).await
    }

    async fn remove(&self, group_id: &str, member_ids: &[String]) -> Result<(), RepositoryError> {
        let group = parse_id(group_id, "group", Operation::Remove)?;
        let delete = self.sql().delete_one;
        let table = self.table;

        run_batch(&self.pool, Operation::Remove, member_ids, |conn, member_id| {
            let query = raw_query(
                delete.clone(),
                vec![Bind::Uuid(group), Bind::Text(member_id.clone())],
            );
            async move {
                let removed = query.execute(conn).await?;
                if removed == 0 {
                    return Err(BatchError::Rejected(RepositoryError::not_found(format!(
                        "{table} of {member_id} in group {group}"
                    ))));
                }
                Ok(())
            }
            .boxed()
        })
        .await?;
        Ok(())
    }
}
