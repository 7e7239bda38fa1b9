//! HTTP implementations of the collaborator traits

pub mod client;
pub mod cluster;
pub mod parameters;
pub mod pipeline;
