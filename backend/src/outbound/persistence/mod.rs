//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the repository ports
//! backed by PostgreSQL via Diesel with async support through `diesel-async`
//! and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain records. Ownership rules (cascades, restrict) live in the schema.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Shared machinery**: list queries go through `query_builder` and
//!   `listing`, multi-record writes through `batch`, and every failure
//!   through `error_mapping`.
//!
//! # Example
//!
//! ```ignore
//! use things_store::outbound::persistence::{DbPool, DieselThingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/things")).await?;
//! let things = DieselThingRepository::new(pool);
//! ```

mod batch;
mod diesel_connection_repository;
mod diesel_group_member_repository;
mod diesel_group_repository;
mod diesel_profile_repository;
mod diesel_thing_repository;
mod error_mapping;
mod listing;
mod migrations;
mod models;
mod pool;
mod query_builder;
mod schema;

pub use diesel_connection_repository::DieselConnectionRepository;
pub use diesel_group_member_repository::DieselGroupMemberRepository;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_thing_repository::DieselThingRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
