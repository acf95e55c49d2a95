//! Paginated listing with a matching total count.
//!
//! The window and the count are read inside one read-only `REPEATABLE READ`
//! transaction from the same rendered `WHERE` clause, so both statements see
//! one snapshot and the total describes the set the items were drawn from.

use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Jsonb, Text, Uuid as SqlUuid};
use diesel::QueryableByName;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::RepositoryError;

use super::error_mapping::{Operation, map_diesel_error, map_pool_error};
use super::models::CountRow;
use super::pool::DbPool;
use super::query_builder::{Bind, FilterClause, ListTable, Predicate, render_order, render_window};

type RawQuery = BoxedSqlQuery<'static, Pg, SqlQuery>;

impl Bind {
    /// Attach this value to the next placeholder of `query`.
    pub(crate) fn attach(self, query: RawQuery) -> RawQuery {
        match self {
            Self::Text(value) => query.bind::<Text, _>(value),
            Self::Json(value) => query.bind::<Jsonb, _>(value),
            Self::Uuid(value) => query.bind::<SqlUuid, _>(value),
            Self::UuidList(values) => query.bind::<Array<SqlUuid>, _>(values),
            Self::BigInt(value) => query.bind::<BigInt, _>(value),
        }
    }
}

/// Build a boxed raw query from SQL text and its ordered binds.
pub(crate) fn raw_query(sql: String, binds: Vec<Bind>) -> RawQuery {
    binds
        .into_iter()
        .fold(sql_query(sql).into_boxed(), |query, bind| bind.attach(query))
}

/// Statements for one page: the windowed select and its count.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PageStatements {
    pub select_sql: String,
    pub select_binds: Vec<Bind>,
    pub count_sql: String,
    pub count_binds: Vec<Bind>,
}

impl PageStatements {
    /// Render both statements for `table` under `predicates`.
    pub(crate) fn render(table: &ListTable, predicates: Vec<Predicate>, request: &PageRequest) -> Self {
        let filter = FilterClause::render(predicates);
        let order = render_order(table, request);
        let (window, window_binds) = render_window(request, filter.next_placeholder());

        let mut select_binds = filter.binds.clone();
        select_binds.extend(window_binds);

        Self {
            select_sql: format!(
                "SELECT {} FROM {}{}{order}{window}",
                table.columns, table.table, filter.sql
            ),
            select_binds,
            count_sql: format!("SELECT COUNT(*) AS total FROM {}{}", table.table, filter.sql),
            count_binds: filter.binds,
        }
    }
}

/// Load one page of `Row`s and the total number of matches.
///
/// `predicates` must already include the request's own filters; callers
/// usually prepend scope predicates to the output of `build_filters`.
pub(crate) async fn fetch_page<Row, T>(
    pool: &DbPool,
    table: &ListTable,
    predicates: Vec<Predicate>,
    request: &PageRequest,
) -> Result<Page<T>, RepositoryError>
where
    Row: QueryableByName<Pg> + Send + 'static,
    T: From<Row>,
{
    let statements = PageStatements::render(table, predicates, request);
    let mut conn = pool
        .get()
        .await
        .map_err(|err| map_pool_error(err, Operation::Retrieve))?;

    let (rows, count) = conn
        .build_transaction()
        .read_only()
        .repeatable_read()
        .run(|conn| {
            async move {
                let PageStatements {
                    select_sql,
                    select_binds,
                    count_sql,
                    count_binds,
                } = statements;
                let rows: Vec<Row> = raw_query(select_sql, select_binds).load(conn).await?;
                let count: CountRow = raw_query(count_sql, count_binds).get_result(conn).await?;
                Ok::<_, diesel::result::Error>((rows, count))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, Operation::Retrieve))?;

    let total = u64::try_from(count.total).unwrap_or_default();
    Ok(Page::new(rows, total, request).map(T::from))
}
