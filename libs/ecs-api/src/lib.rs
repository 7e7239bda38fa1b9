//! ECS API wire models
//!
//! Request and response bodies for the subset of the ECS JSON protocol the
//! deployer speaks. Field names follow the service's camelCase convention.

pub mod models;

pub use models::*;
