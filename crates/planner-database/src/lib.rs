//! # planner-database
//!
//! Persistence for the table planner: the PostgreSQL pool and migrations,
//! the store traits services depend on, their sqlx-backed repositories,
//! and an in-memory implementation for tests and single-node development.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::Stores;
