//! Validation of Twitter wire records into core records.
use crate::twitter::types::{Tweet, User};
use hashtally_core::{PlatformError, Post, TagMention, UserInfo};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// Code used for failures that never reached the platform's error envelope.
pub const LOCAL_ERROR_CODE: i64 = 0;

pub fn user_info(user: User) -> UserInfo {
    UserInfo {
        handle: user.screen_name,
        followers_count: user.followers_count,
        total_posts_count: user.statuses_count,
    }
}

/// Convert a timeline entry; hashtags keep their original casing and order.
pub fn post_from_tweet(tweet: Tweet) -> Result<Post, PlatformError> {
    let created_at = parse_created_at(&tweet.created_at).ok_or_else(|| {
        PlatformError::new(
            LOCAL_ERROR_CODE,
            format!(
                "tweet {} has unparseable created_at {:?}",
                tweet.id, tweet.created_at
            ),
        )
    })?;

    let tags = tweet
        .entities
        .map(|e| e.hashtags)
        .unwrap_or_default()
        .into_iter()
        .map(|h| TagMention::new(h.text))
        .collect();

    Ok(Post {
        id: tweet.id,
        created_at,
        tags,
    })
}

/// Accepts v1.1's `Wed Oct 10 20:19:24 +0000 2018` and RFC 3339.
pub fn parse_created_at(raw: &str) -> Option<OffsetDateTime> {
    let classic = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
    );
    OffsetDateTime::parse(raw, classic)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .ok()
}
