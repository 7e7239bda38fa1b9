//! Filesystem helpers for artifact scratch space

pub mod dir;
pub mod file;
