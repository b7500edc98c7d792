//! Pagination loop that turns a user timeline into per-tag counts.
//!
//! Requests are strictly sequential: each page's cursor is derived from the
//! last post of the previous page, so nothing here is spawned or joined.
use crate::budget::next_request_size;
use crate::error::AggregateError;
use crate::traits::TimelineClient;
use crate::types::{AggregationResult, HashtagCounts, Post, TagFilter};
use std::sync::Arc;
use time::OffsetDateTime;

pub const DEFAULT_MAX_POSTS: u64 = 500;
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Per-run knobs for [`HashtagAggregator::aggregate_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Raw tags to keep; empty keeps every tag.
    pub filter_tags: Vec<String>,
    /// Upper bound on posts read across all pages.
    pub max_posts: u64,
    /// Posts requested per page.
    pub page_size: u32,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            filter_tags: Vec::new(),
            max_posts: DEFAULT_MAX_POSTS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AggregateOptions {
    pub fn with_filter_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_posts(mut self, n: u64) -> Self {
        self.max_posts = n;
        self
    }

    pub fn with_page_size(mut self, n: u32) -> Self {
        self.page_size = n;
        self
    }
}

/// Counts hashtags over a user's timeline through a [`TimelineClient`].
#[derive(Clone)]
pub struct HashtagAggregator {
    client: Arc<dyn TimelineClient>,
}

impl HashtagAggregator {
    pub fn new(client: Arc<dyn TimelineClient>) -> Self {
        Self { client }
    }

    /// Run with explicit parameters.
    ///
    /// Any platform failure aborts the run; counts gathered before the failure
    /// are dropped rather than returned.
    pub async fn aggregate<S: AsRef<str>>(
        &self,
        handle: &str,
        filter_tags: &[S],
        max_posts: u64,
        page_size: u32,
    ) -> Result<AggregationResult, AggregateError> {
        self.validate(handle, max_posts, page_size)?;
        let filter = TagFilter::from_tags(filter_tags.iter().map(AsRef::as_ref));

        let user = self
            .client
            .get_user(handle)
            .await
            .map_err(|e| {
                tracing::warn!(handle, code = e.code, message = %e.message, "aggregate.user_lookup_failed");
                AggregateError::user_lookup(e)
            })?;

        tracing::info!(
            handle,
            followers = user.followers_count,
            total_posts = user.total_posts_count,
            filter_len = filter.len(),
            max_posts,
            page_size,
            "aggregate.start"
        );

        let mut posts_read: u64 = 0;
        let mut cursor: Option<u64> = None;
        let mut oldest_post_read: Option<OffsetDateTime> = None;
        let mut counts = HashtagCounts::new();

        while posts_read < max_posts {
            let request = next_request_size(posts_read, page_size, max_posts);
            let page = self
                .client
                .get_timeline(handle, request, cursor)
                .await
                .map_err(|e| {
                    tracing::warn!(
                        handle,
                        posts_read,
                        ?cursor,
                        code = e.code,
                        message = %e.message,
                        "aggregate.page_failed"
                    );
                    AggregateError::timeline_fetch(e)
                })?;

            let Some(last) = page.last() else {
                tracing::debug!(handle, posts_read, ?cursor, "aggregate.timeline_exhausted");
                break;
            };
            let (last_id, last_created_at) = (last.id, last.created_at);

            count_page(&page, &filter, &mut counts);
            posts_read += page.len() as u64;
            oldest_post_read = Some(last_created_at);

            tracing::debug!(
                handle,
                requested = request,
                received = page.len(),
                posts_read,
                last_id,
                "aggregate.page"
            );

            // max_id is inclusive, so step below the last post we saw
            match last_id.checked_sub(1) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::info!(
            handle,
            posts_read,
            distinct_tags = counts.len(),
            mentions = counts.total(),
            "aggregate.done"
        );

        Ok(AggregationResult {
            handle: handle.to_owned(),
            followers_count: user.followers_count,
            total_posts_count: user.total_posts_count,
            run_date: OffsetDateTime::now_utc().date(),
            posts_read,
            oldest_post_read,
            hashtag_counts: counts,
        })
    }

    /// Run with an [`AggregateOptions`] bundle.
    pub async fn aggregate_with(
        &self,
        handle: &str,
        opts: &AggregateOptions,
    ) -> Result<AggregationResult, AggregateError> {
        self.aggregate(handle, &opts.filter_tags, opts.max_posts, opts.page_size)
            .await
    }

    fn validate(&self, handle: &str, max_posts: u64, page_size: u32) -> Result<(), AggregateError> {
        if handle.trim().is_empty() {
            return Err(AggregateError::invalid("handle", "must not be empty"));
        }
        if handle != handle.trim() {
            return Err(AggregateError::invalid(
                "handle",
                format!("{handle:?} has surrounding whitespace"),
            ));
        }
        if handle.starts_with('@') {
            return Err(AggregateError::invalid(
                "handle",
                format!("{handle:?} must not start with '@'"),
            ));
        }
        if max_posts == 0 {
            return Err(AggregateError::invalid("max_posts", "must be positive"));
        }
        if page_size == 0 {
            return Err(AggregateError::invalid("page_size", "must be positive"));
        }
        let limit = self.client.max_page_size();
        if page_size > limit {
            return Err(AggregateError::invalid(
                "page_size",
                format!("{page_size} exceeds the platform limit of {limit}"),
            ));
        }
        Ok(())
    }
}

fn count_page(page: &[Post], filter: &TagFilter, counts: &mut HashtagCounts) {
    for post in page {
        for tag in &post.tags {
            if filter.admits(&tag.raw_text) {
                counts.increment(&tag.raw_text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagMention;
    use time::macros::datetime;

    fn post(id: u64, tags: &[&str]) -> Post {
        Post {
            id,
            created_at: datetime!(2024-01-01 00:00 UTC),
            tags: tags.iter().map(|t| TagMention::new(*t)).collect(),
        }
    }

    #[test]
    fn count_page_applies_filter_per_mention() {
        let filter = TagFilter::from_tags(["cats"]);
        let mut counts = HashtagCounts::new();
        count_page(&[post(1, &["Cats", "Dogs", "café"])], &filter, &mut counts);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("Cats"), Some(1));
    }

    #[test]
    fn count_page_skips_posts_without_tags() {
        let mut counts = HashtagCounts::new();
        count_page(&[post(2, &[]), post(1, &["x"])], &TagFilter::default(), &mut counts);
        assert_eq!(counts.get("x"), Some(1));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn default_options_are_fresh_per_instance() {
        let mut a = AggregateOptions::default();
        a.filter_tags.push("leak".into());
        let b = AggregateOptions::default();
        assert!(b.filter_tags.is_empty());
        assert_eq!(b.max_posts, DEFAULT_MAX_POSTS);
        assert_eq!(b.page_size, DEFAULT_PAGE_SIZE);
    }
}
