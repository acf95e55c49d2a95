//! Translation of Diesel and pool failures into [`RepositoryError`].
//!
//! Every adapter funnels storage failures through [`map_diesel_error`] so the
//! same engine condition always surfaces as the same domain kind. The
//! operation being performed decides the generic fallback kind and how a
//! foreign-key violation is read.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Kind of statement that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Create,
    Update,
    Retrieve,
    Remove,
}

impl Operation {
    /// Generic failure kind for this operation.
    pub(crate) fn failed(self, message: impl Into<String>) -> RepositoryError {
        match self {
            Self::Create => RepositoryError::create_failed(message),
            Self::Update => RepositoryError::update_failed(message),
            Self::Retrieve => RepositoryError::retrieve_failed(message),
            Self::Remove => RepositoryError::remove_failed(message),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Retrieve => "retrieve",
            Self::Remove => "remove",
        }
    }
}

/// Map pool checkout and build failures to the operation's generic kind.
pub(crate) fn map_pool_error(error: PoolError, operation: Operation) -> RepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    debug!(operation = operation.as_str(), %message, "pool checkout failed");
    operation.failed(message)
}

/// Map a Diesel error to the domain taxonomy.
///
/// Foreign-key violations mean "still referenced" when removing and
/// "referenced parent is missing" otherwise.
pub(crate) fn map_diesel_error(error: DieselError, operation: Operation) -> RepositoryError {
    match error {
        DieselError::NotFound => RepositoryError::not_found("record not found"),
        DieselError::DatabaseError(kind, info) => {
            let message = info.message().to_owned();
            let constraint = info.constraint_name().map(str::to_owned);
            map_database_error(kind, message, constraint, operation)
        }
        other => {
            warn!(
                operation = operation.as_str(),
                error = %other,
                "unclassified diesel error"
            );
            operation.failed(other.to_string())
        }
    }
}

fn map_database_error(
    kind: DatabaseErrorKind,
    message: String,
    constraint: Option<String>,
    operation: Operation,
) -> RepositoryError {
    debug!(
        operation = operation.as_str(),
        ?kind,
        constraint = ?constraint,
        %message,
        "database rejected statement"
    );
    match kind {
        DatabaseErrorKind::UniqueViolation => RepositoryError::conflict(message),
        DatabaseErrorKind::ForeignKeyViolation => match operation {
            Operation::Remove => RepositoryError::entity_in_use(message),
            _ => RepositoryError::not_found(message),
        },
        DatabaseErrorKind::NotNullViolation | DatabaseErrorKind::CheckViolation => {
            RepositoryError::malformed_entity(message)
        }
        _ => classify_by_message(message, operation),
    }
}

fn classify_by_message(message: String, operation: Operation) -> RepositoryError {
    let lower = message.to_lowercase();
    if lower.contains("invalid input syntax") {
        return match operation {
            Operation::Create => RepositoryError::malformed_entity(message),
            _ => RepositoryError::not_found(message),
        };
    }
    if lower.contains("value too long") {
        return RepositoryError::malformed_entity(message);
    }
    warn!(
        operation = operation.as_str(),
        %message,
        "unclassified database error"
    );
    operation.failed(message)
}

/// Parse a record's own identifier.
///
/// An id that is not a UUID cannot name a stored row, so outside of creation
/// it reads as `NotFound`.
pub(crate) fn parse_id(raw: &str, entity: &str, operation: Operation) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(raw).map_err(|_| match operation {
        Operation::Create => RepositoryError::malformed_entity(format!("invalid {entity} id: {raw}")),
        _ => RepositoryError::not_found(format!("{entity} {raw}")),
    })
}

/// Parse an id that must reference an existing parent row.
pub(crate) fn parse_reference(raw: &str, entity: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(raw).map_err(|_| RepositoryError::not_found(format!("{entity} {raw}")))
}

/// Parse every id that can name a row, dropping the rest.
pub(crate) fn parse_ids(raw: &[String]) -> Vec<Uuid> {
    raw.iter()
        .filter_map(|id| Uuid::parse_str(id).ok())
        .collect()
}
