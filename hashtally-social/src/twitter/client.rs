//! Twitter/X v1.1 client for user lookups and user timelines.
//!
//! Uses app-only bearer auth through the shared HTTP client. Requests are not
//! retried unless [`TwitterApi::with_retries`] asks for it.
use crate::twitter::extract::{self, LOCAL_ERROR_CODE};
use crate::twitter::types::{Tweet, User};
use async_trait::async_trait;
use hashtally_core::{PlatformError, Post, TimelineClient, UserInfo};
use hashtally_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";
/// `statuses/user_timeline` refuses `count` above this.
pub const MAX_TIMELINE_PAGE: u32 = 200;

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    pub fn new(bearer_token: String) -> Result<Self, HttpError> {
        Self::with_base_url(DEFAULT_BASE_URL, bearer_token)
    }

    /// Point at another host, e.g. a proxy or a test server.
    pub fn with_base_url(base_url: &str, bearer_token: String) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            bearer: bearer_token,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.http = self.http.with_timeout(dur);
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.http = self.http.with_retries(n);
        self
    }

    /// `GET 1.1/users/show.json?screen_name=...`
    pub async fn users_show(&self, screen_name: &str) -> Result<User, HttpError> {
        let user: User = self
            .http
            .get_json(
                "1.1/users/show.json",
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(vec![
                        ("screen_name", screen_name.into()),
                        ("include_entities", "false".into()),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        if user.protected == Some(true) {
            tracing::warn!(screen_name, "twitter.user_protected");
        }
        tracing::debug!(
            screen_name,
            user_id = user.id,
            followers = user.followers_count,
            statuses = user.statuses_count,
            "twitter.users_show"
        );
        Ok(user)
    }

    /// `GET 1.1/statuses/user_timeline.json`, newest first, ids `<= max_id`.
    pub async fn user_timeline(
        &self,
        screen_name: &str,
        count: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<Tweet>, HttpError> {
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("screen_name", screen_name.into()),
            ("count", count.min(MAX_TIMELINE_PAGE).to_string().into()),
            ("trim_user", "true".into()),
            ("exclude_replies", "false".into()),
            ("contributor_details", "false".into()),
            ("tweet_mode", "extended".into()),
        ];
        if let Some(id) = max_id {
            params.push(("max_id", id.to_string().into()));
        }

        let tweets: Vec<Tweet> = self
            .http
            .get_json(
                "1.1/statuses/user_timeline.json",
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            screen_name,
            count,
            ?max_id,
            received = tweets.len(),
            "twitter.user_timeline"
        );
        Ok(tweets)
    }
}

fn platform_error(err: HttpError) -> PlatformError {
    PlatformError::new(err.code().unwrap_or(LOCAL_ERROR_CODE), err.message())
}

#[async_trait]
impl TimelineClient for TwitterApi {
    async fn get_user(&self, handle: &str) -> Result<UserInfo, PlatformError> {
        self.users_show(handle)
            .await
            .map(extract::user_info)
            .map_err(platform_error)
    }

    async fn get_timeline(
        &self,
        handle: &str,
        count: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<Post>, PlatformError> {
        self.user_timeline(handle, count, max_id)
            .await
            .map_err(platform_error)?
            .into_iter()
            .map(extract::post_from_tweet)
            .collect()
    }

    fn max_page_size(&self) -> u32 {
        MAX_TIMELINE_PAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_map_to_local_code() {
        let err = platform_error(HttpError::Network("connection refused".into()));
        assert_eq!(err.code, LOCAL_ERROR_CODE);
        assert_eq!(err.message, "network error: connection refused");
    }

    #[test]
    fn default_base_url_parses() {
        assert!(TwitterApi::new("token".into()).is_ok());
    }
}
