//! Deployment reconciliation core

pub mod cluster;
pub mod executor;
pub mod manifest;
pub mod outcome;
pub mod reconcile;
pub mod rollout;
