//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Only PostgreSQL persistence lives here. Adapters convert between domain
//! records and storage representations and contain no business rules.

pub mod persistence;
