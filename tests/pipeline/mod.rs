//! Pass-level integration tests

pub mod package_tests;
pub mod symbol_tests;
