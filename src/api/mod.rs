//! HTTP REST API
//!
//! - `dto`: response envelope shared by every endpoint
//! - `handlers`: request handlers for all resources
//! - `validation`: JSON extractor with field validation
//! - `router`: API router with Swagger documentation

pub mod dto;
pub mod handlers;
pub mod router;
pub mod validation;

pub use router::create_api_router;
