use hashtally_core::{AggregateError, HashtagAggregator, TimelineClient};
use hashtally_social::twitter::TwitterApi;
use serde_json::{Value, json};
use std::sync::Arc;
use time::macros::datetime;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USERS_SHOW: &str = "/1.1/users/show.json";
const TIMELINE: &str = "/1.1/statuses/user_timeline.json";

fn tweet(id: u64, created_at: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "id_str": id.to_string(),
        "created_at": created_at,
        "full_text": tags.iter().map(|t| format!("#{t}")).collect::<Vec<_>>().join(" "),
        "entities": {
            "hashtags": tags.iter().map(|t| json!({ "text": t, "indices": [0, 1] })).collect::<Vec<_>>(),
            "user_mentions": [],
            "urls": []
        }
    })
}

async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(USERS_SHOW))
        .and(query_param("screen_name", "ferris"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "id_str": "12",
            "screen_name": "ferris",
            "name": "Ferris",
            "followers_count": 1234,
            "statuses_count": 3,
            "protected": false
        })))
        .mount(server)
        .await;
}

fn api(server: &MockServer) -> TwitterApi {
    TwitterApi::with_base_url(&server.uri(), "test-token".into()).unwrap()
}

#[tokio::test]
async fn paginates_with_max_id_and_counts_raw_tags() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("screen_name", "ferris"))
        .and(query_param("count", "2"))
        .and(query_param("trim_user", "true"))
        .and(query_param("exclude_replies", "false"))
        .and(query_param_is_missing("max_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            tweet(100, "Sun Mar 03 12:00:00 +0000 2024", &["Rust"]),
            tweet(99, "Sat Mar 02 12:00:00 +0000 2024", &["rust", "Go"]),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("max_id", "98"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tweet(
            50,
            "Mon Jan 15 08:30:00 +0000 2024",
            &["Go"]
        )])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("max_id", "49"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let aggregator = HashtagAggregator::new(Arc::new(api(&server)));
    let result = aggregator
        .aggregate("ferris", &[] as &[&str], 500, 2)
        .await
        .unwrap();

    assert_eq!(result.handle, "ferris");
    assert_eq!(result.followers_count, 1234);
    assert_eq!(result.total_posts_count, 3);
    assert_eq!(result.posts_read, 3);
    assert_eq!(result.oldest_post_read, Some(datetime!(2024-01-15 08:30 UTC)));
    assert_eq!(result.hashtag_counts.get("Rust"), Some(1));
    assert_eq!(result.hashtag_counts.get("rust"), Some(1));
    assert_eq!(result.hashtag_counts.get("Go"), Some(2));
    assert_eq!(result.hashtag_counts.len(), 3);
}

#[tokio::test]
async fn unknown_user_is_a_lookup_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USERS_SHOW))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"errors": [{"code": 50, "message": "User not found."}]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = HashtagAggregator::new(Arc::new(api(&server)))
        .aggregate("ferris", &[] as &[&str], 500, 200)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AggregateError::UserLookup {
            code: 50,
            message: "User not found.".into()
        }
    );
}

#[tokio::test]
async fn protected_timeline_is_a_fetch_error_with_http_status() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "request": "/1.1/statuses/user_timeline.json",
            "error": "Not authorized."
        })))
        .mount(&server)
        .await;

    let err = HashtagAggregator::new(Arc::new(api(&server)))
        .aggregate("ferris", &[] as &[&str], 500, 200)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AggregateError::TimelineFetch {
            code: 401,
            message: "Not authorized.".into()
        }
    );
}

#[tokio::test]
async fn filter_applies_to_twitter_hashtags() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param_is_missing("max_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tweet(
            10,
            "Wed Oct 10 20:19:24 +0000 2018",
            &["Cats", "Dogs", "café"]
        )])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("max_id", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = HashtagAggregator::new(Arc::new(api(&server)))
        .aggregate("ferris", &["cats"], 500, 200)
        .await
        .unwrap();

    assert_eq!(result.hashtag_counts.len(), 1);
    assert_eq!(result.hashtag_counts.get("Cats"), Some(1));
}

#[tokio::test]
async fn user_without_counts_is_a_lookup_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USERS_SHOW))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 12, "screen_name": "ferris"})),
        )
        .mount(&server)
        .await;

    let err = HashtagAggregator::new(Arc::new(api(&server)))
        .aggregate("ferris", &[] as &[&str], 500, 200)
        .await
        .unwrap_err();

    match err {
        AggregateError::UserLookup { code, message } => {
            assert_eq!(code, 0);
            assert!(message.contains("followers_count"), "{message}");
        }
        other => panic!("expected UserLookup, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_timestamp_fails_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 3, "created_at": "last tuesday" }])),
        )
        .mount(&server)
        .await;

    let err = api(&server)
        .get_timeline("ferris", 10, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, 0);
    assert!(err.message.contains("last tuesday"));
}

#[test]
fn twitter_page_limit_is_200() {
    let client = TwitterApi::new("token".into()).unwrap();
    assert_eq!(client.max_page_size(), 200);
}
