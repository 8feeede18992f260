//! # Blink
//!
//! Backend service for Blink, a web application for sharing
//! self-destructing encrypted secrets. This service owns programmatic
//! access (API keys) and usage analytics; secret payloads are encrypted
//! and handled client-side and never pass through these modules.
//!
//! ## Architecture
//!
//! - **domain**: core types, typed event payloads, error model
//! - **application**: API key and analytics services
//! - **infrastructure**: database connection, entities, migrations
//! - **auth**: token hashing, JWT sessions, request authentication
//! - **api**: REST API with Swagger documentation and the landing page

pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use api::create_api_router;
