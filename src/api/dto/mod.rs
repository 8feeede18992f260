//! Data Transfer Objects for REST API

pub mod common;

pub use common::*;
