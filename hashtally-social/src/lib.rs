//! Social network adapters for hashtally.
//!
//! Only Twitter/X is implemented. Each adapter turns platform JSON into
//! [`hashtally_core`] records and implements [`hashtally_core::TimelineClient`].
pub mod twitter;
