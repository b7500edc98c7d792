/// Number of posts to ask for in the next page request.
///
/// Returns `page_size` unless that would overshoot `max_posts`, in which case
/// only the remainder is requested. An exhausted budget yields `0`.
///
/// ```
/// use hashtally_core::next_request_size;
///
/// assert_eq!(next_request_size(0, 200, 500), 200);
/// assert_eq!(next_request_size(400, 200, 500), 100);
/// ```
pub fn next_request_size(posts_read: u64, page_size: u32, max_posts: u64) -> u32 {
    let remaining = max_posts.saturating_sub(posts_read);
    if u64::from(page_size) > remaining {
        // remaining < page_size <= u32::MAX
        remaining as u32
    } else {
        page_size
    }
}
