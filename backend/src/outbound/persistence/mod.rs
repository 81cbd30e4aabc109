//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling, alongside in-memory
//! equivalents for development and end-to-end tests.
//!
//! # Architecture
//!
//! The persistence layer follows these principles:
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Async-safe pooling**: Connections are managed via `bb8` pools with
//!   proper async integration through `diesel-async`.
//! - **Strongly typed errors**: All database errors are mapped to domain
//!   persistence error types.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/mydb");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_error;
mod diesel_rating_repository;
mod diesel_swap_repository;
mod diesel_user_repository;
mod memory;
mod models;
mod pool;
mod schema;

pub use diesel_rating_repository::DieselRatingRepository;
pub use diesel_swap_repository::DieselSwapRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use memory::{MemoryRatingRepository, MemorySwapRepository, MemoryUserRepository};
pub use pool::{DbPool, PoolConfig, PoolError};
