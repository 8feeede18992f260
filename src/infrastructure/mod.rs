//! External concerns: database connection, entities, migrations

pub mod database;

pub use database::{init_database, DatabaseConfig};
