//! Crate-level test suites and shared test doubles.

pub(crate) mod support;
