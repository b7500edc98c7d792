use crate::error::PlatformError;
use crate::types::{Post, UserInfo};
use async_trait::async_trait;

/// Largest page most timeline endpoints hand out per request.
pub const DEFAULT_PLATFORM_PAGE_LIMIT: u32 = 200;

/// Read access to a platform's user metadata and paged user timeline.
#[async_trait]
pub trait TimelineClient: Send + Sync {
    /// Look up the public profile for `handle` (without any `@` prefix).
    async fn get_user(&self, handle: &str) -> Result<UserInfo, PlatformError>;

    /// Fetch up to `count` posts by `handle`, newest first.
    ///
    /// With `max_id` set only posts whose id is at most `max_id` are returned.
    /// An exhausted timeline yields an empty vector, not an error.
    async fn get_timeline(
        &self,
        handle: &str,
        count: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<Post>, PlatformError>;

    /// Per-request page size ceiling enforced by the platform.
    fn max_page_size(&self) -> u32 {
        DEFAULT_PLATFORM_PAGE_LIMIT
    }
}
