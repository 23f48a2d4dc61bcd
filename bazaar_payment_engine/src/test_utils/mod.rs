//! Helpers for tests and local tooling. Only compiled with the `test_utils` feature.
pub mod fixtures;
pub mod prepare_env;
