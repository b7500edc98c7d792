//! Shared helpers for hashtally binaries and integration tests.
//!
//! Right now this is only [`observability`], the single place where the
//! global `tracing` subscriber gets installed.
pub mod observability;
