//! Pipeline API wire models
//!
//! The job event a pipeline delivers to a custom deploy action, and the job
//! result payloads the action reports back.

pub mod models;

pub use models::*;
