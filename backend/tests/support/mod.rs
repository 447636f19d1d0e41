//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates, so helpers used by more
//! than one suite live here and are pulled in with `mod support;`.

pub mod embedded_postgres;

pub use embedded_postgres::test_database;
