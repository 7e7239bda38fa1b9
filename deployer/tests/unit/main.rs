//! Integration tests for the deployer

mod fixtures;
mod test_run;
