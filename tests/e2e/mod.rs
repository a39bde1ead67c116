//! End-to-end tests over mocked host tools.

pub mod enrollment_tests;
pub mod lifecycle_tests;
