//! Rendering of list filters into SQL fragments with bound parameters.
//!
//! Only whitelisted column names and sort tokens are ever interpolated into
//! SQL text. Every caller-provided value travels as a [`Bind`] and is
//! referenced by a `$n` placeholder numbered when the clause is rendered.

use pagination::{PageRequest, SortKey};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{ListScope, RepositoryError};

use super::error_mapping::parse_ids;

/// A value bound to one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Bind {
    Text(String),
    Json(Value),
    Uuid(Uuid),
    UuidList(Vec<Uuid>),
    BigInt(i64),
}

/// One independent filter fragment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    /// `column ILIKE $n` with an escaped `%…%` pattern. Case folding
    /// happens in the database on both sides.
    NameContains { column: &'static str, pattern: String },
    /// `column @> $n`: stored document contains the probe.
    MetadataContains { column: &'static str, probe: Value },
    /// `column = $n`.
    Equals { column: &'static str, value: Bind },
    /// `column = ANY($n)`. An empty list matches nothing.
    AnyOf { column: &'static str, ids: Vec<Uuid> },
    /// `column IN (<select> $n)` where `select` ends with a comparison.
    InSubquery {
        column: &'static str,
        select: &'static str,
        value: Bind,
    },
}

impl Predicate {
    fn render(&self, placeholder: usize) -> String {
        match self {
            Self::NameContains { column, .. } => format!("{column} ILIKE ${placeholder}"),
            Self::MetadataContains { column, .. } => format!("{column} @> ${placeholder}"),
            Self::Equals { column, .. } => format!("{column} = ${placeholder}"),
            Self::AnyOf { column, .. } => format!("{column} = ANY(${placeholder})"),
            Self::InSubquery { column, select, .. } => {
                format!("{column} IN ({select} ${placeholder})")
            }
        }
    }

    fn into_bind(self) -> Bind {
        match self {
            Self::NameContains { pattern, .. } => Bind::Text(pattern),
            Self::MetadataContains { probe, .. } => Bind::Json(probe),
            Self::Equals { value, .. } | Self::InSubquery { value, .. } => value,
            Self::AnyOf { ids, .. } => Bind::UuidList(ids),
        }
    }
}

/// Rendered `WHERE` clause and the values for its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FilterClause {
    /// Empty, or ` WHERE a AND b …` with a leading space.
    pub sql: String,
    pub binds: Vec<Bind>,
}

impl FilterClause {
    /// Join predicates with `AND`, numbering placeholders from `$1`.
    pub(crate) fn render(predicates: Vec<Predicate>) -> Self {
        if predicates.is_empty() {
            return Self::default();
        }
        let fragments: Vec<String> = predicates
            .iter()
            .enumerate()
            .map(|(index, predicate)| predicate.render(index + 1))
            .collect();
        let binds = predicates.into_iter().map(Predicate::into_bind).collect();
        Self {
            sql: format!(" WHERE {}", fragments.join(" AND ")),
            binds,
        }
    }

    /// Placeholder number the next appended bind must use.
    pub(crate) fn next_placeholder(&self) -> usize {
        self.binds.len() + 1
    }
}

/// Static description of a listable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListTable {
    pub table: &'static str,
    /// Select list, aliased to the row struct's field names.
    pub columns: &'static str,
    /// Column sorted by [`SortKey::Id`] and used as the tiebreaker.
    pub id_column: &'static str,
    /// Column sorted by [`SortKey::Name`] and matched by the name filter.
    pub name_column: &'static str,
    /// JSON column probed by the metadata filter, if the table has one.
    pub metadata_column: Option<&'static str>,
}

/// How a [`ListScope`] applies to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeTarget {
    /// The table is `groups` itself.
    Groups,
    /// The table carries a `group_id`-like column.
    OwnedBy(&'static str),
}

/// Predicate restricting a listing to `scope`, if it restricts anything.
pub(crate) fn scope_predicate(scope: &ListScope, target: ScopeTarget) -> Option<Predicate> {
    match (scope, target) {
        (ListScope::All, _) => None,
        (ListScope::Groups(ids), ScopeTarget::Groups) => Some(Predicate::AnyOf {
            column: "id",
            ids: parse_ids(ids),
        }),
        (ListScope::Groups(ids), ScopeTarget::OwnedBy(column)) => Some(Predicate::AnyOf {
            column,
            ids: parse_ids(ids),
        }),
        (ListScope::Organization(org_id), target) => {
            let Ok(org_id) = Uuid::parse_str(org_id) else {
                let column = match target {
                    ScopeTarget::Groups => "id",
                    ScopeTarget::OwnedBy(column) => column,
                };
                return Some(Predicate::AnyOf {
                    column,
                    ids: Vec::new(),
                });
            };
            Some(match target {
                ScopeTarget::Groups => Predicate::Equals {
                    column: "org_id",
                    value: Bind::Uuid(org_id),
                },
                ScopeTarget::OwnedBy(column) => Predicate::InSubquery {
                    column,
                    select: "SELECT id FROM groups WHERE org_id =",
                    value: Bind::Uuid(org_id),
                },
            })
        }
    }
}

/// Escape `LIKE` wildcards so the name filter is a literal substring match.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Predicates derived from the request's name and metadata filters.
///
/// Fails with `MalformedEntity` when the request is out of range.
pub(crate) fn build_filters(
    table: &ListTable,
    request: &PageRequest,
) -> Result<Vec<Predicate>, RepositoryError> {
    request
        .validate()
        .map_err(|err| RepositoryError::malformed_entity(err.to_string()))?;

    let mut predicates = Vec::new();
    if let Some(name) = request.name_filter() {
        predicates.push(Predicate::NameContains {
            column: table.name_column,
            pattern: format!("%{}%", escape_like(name)),
        });
    }
    if let Some(column) = table.metadata_column.filter(|_| !request.metadata.is_empty()) {
        predicates.push(Predicate::MetadataContains {
            column,
            probe: Value::Object(request.metadata.clone()),
        });
    }
    Ok(predicates)
}

/// ` ORDER BY …` for the request, with the id column as tiebreaker.
pub(crate) fn render_order(table: &ListTable, request: &PageRequest) -> String {
    let direction = request.direction.as_sql();
    match request.order {
        SortKey::Name if table.name_column != table.id_column => format!(
            " ORDER BY {} {direction}, {} {direction}",
            table.name_column, table.id_column
        ),
        SortKey::Name | SortKey::Id => format!(" ORDER BY {} {direction}", table.id_column),
    }
}

/// ` LIMIT $n OFFSET $m` and its binds; nothing when the limit is zero.
pub(crate) fn render_window(request: &PageRequest, first_placeholder: usize) -> (String, Vec<Bind>) {
    if !request.is_windowed() {
        return (String::new(), Vec::new());
    }
    let limit = i64::try_from(request.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(request.offset).unwrap_or(i64::MAX);
    (
        format!(
            " LIMIT ${first_placeholder} OFFSET ${}",
            first_placeholder + 1
        ),
        vec![Bind::BigInt(limit), Bind::BigInt(offset)],
    )
}
