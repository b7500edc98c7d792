//! Hashtag aggregation over a paged user timeline.
//!
//! This crate holds the platform-agnostic pieces of hashtally: the data model,
//! the [`traits::TimelineClient`] capability a platform adapter implements, the
//! tag normalization used for allow-list matching, and the
//! [`aggregator::HashtagAggregator`] that walks a timeline page by page.
//!
//! # Examples
//! ```no_run
//! use hashtally_core::{AggregateOptions, HashtagAggregator, TimelineClient};
//! use std::sync::Arc;
//!
//! # async fn demo(client: Arc<dyn TimelineClient>) -> Result<(), hashtally_core::AggregateError> {
//! let aggregator = HashtagAggregator::new(client);
//! let result = aggregator
//!     .aggregate_with("rustlang", &AggregateOptions::default())
//!     .await?;
//! for (tag, count) in result.hashtag_counts.ranked() {
//!     println!("#{tag}: {count}");
//! }
//! # Ok(()) }
//! ```
pub mod aggregator;
pub mod budget;
pub mod error;
pub mod normalize;
pub mod traits;
pub mod types;

pub use aggregator::{AggregateOptions, HashtagAggregator, DEFAULT_MAX_POSTS, DEFAULT_PAGE_SIZE};
pub use budget::next_request_size;
pub use error::{AggregateError, PlatformError};
pub use normalize::normalize;
pub use traits::TimelineClient;
pub use types::{AggregationResult, HashtagCounts, Post, TagFilter, TagMention, UserInfo};
