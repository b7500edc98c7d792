//! Twitter/X v1.1 timeline adapter.
//!
//! `types` mirrors the wire JSON, `extract` validates it into core records, and
//! `client` issues the requests and implements the `TimelineClient` seam.
pub mod client;
pub mod extract;
pub mod types;

pub use client::TwitterApi;
