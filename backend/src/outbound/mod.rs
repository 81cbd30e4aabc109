//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits for various infrastructure concerns:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM, plus
//!   in-memory equivalents for development and end-to-end tests
//! - **notify**: swap request notification channels (tracing, webhook)
//! - **security**: credential hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod notify;
pub mod persistence;
pub mod security;
