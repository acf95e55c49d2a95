//! Closed error taxonomy shared by every repository port.

use super::define_port_error;

define_port_error! {
    /// Domain-level repository failures.
    ///
    /// Storage-engine errors are translated into exactly one of these kinds
    /// at the adapter boundary. The generic `*Failed` kinds keep the original
    /// cause in `message` for diagnostics.
    pub enum RepositoryError {
        /// Input cannot be stored: bad identifier, oversized field or
        /// invalid filter.
        MalformedEntity { message: String } => "malformed entity: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } => "entity already exists: {message}",
        /// No row matched the key, or the key cannot identify any row.
        NotFound { message: String } => "entity not found: {message}",
        /// The entity is still referenced and cannot be removed.
        EntityInUse { message: String } => "entity is in use: {message}",
        /// Insert failed with no more specific cause.
        CreateFailed { message: String } => "failed to create entity: {message}",
        /// Update failed with no more specific cause.
        UpdateFailed { message: String } => "failed to update entity: {message}",
        /// Read failed with no more specific cause.
        RetrieveFailed { message: String } => "failed to retrieve entity: {message}",
        /// Delete failed with no more specific cause.
        RemoveFailed { message: String } => "failed to remove entity: {message}",
    }
}

impl RepositoryError {
    /// Diagnostic message carried by every variant.
    pub fn message(&self) -> &str {
        match self {
            Self::MalformedEntity { message }
            | Self::Conflict { message }
            | Self::NotFound { message }
            | Self::EntityInUse { message }
            | Self::CreateFailed { message }
            | Self::UpdateFailed { message }
            | Self::RetrieveFailed { message }
            | Self::RemoveFailed { message } => message.as_str(),
        }
    }
}
