//! Application services: business logic over the data store

pub mod services;

pub use services::{AnalyticsService, ApiKeyService};

#[cfg(test)]
pub(crate) mod test_support;
