//! Domain models

pub mod manifest;
