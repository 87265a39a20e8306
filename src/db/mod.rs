//! SQLite persistence for points, audit records and the indexer cursor.
//!
//! `init_db` opens the pool and applies the embedded schema; `Repository`
//! implements the store traits on top of it.

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
