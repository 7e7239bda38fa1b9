//! ECS Deployer Library
//!
//! Pipeline deploy action: reconciles an image manifest against the running
//! services of a cluster and rolls out new task definition revisions.

pub mod app;
pub mod artifacts;
pub mod clients;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod utils;
