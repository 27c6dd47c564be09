//! End-to-end requests over HTTP against a local mock of the API.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{config, start_mock_server};
use futures_util::StreamExt;
use instagram_client::{Config, Instagram, InstagramError, Relationship, RelationshipAction};

#[test]
fn blocking_media_info() {
    let root = start_mock_server();
    let mut instagram = Instagram::new(config(&root)).unwrap();

    let request = instagram.endpoints().media_info("123_456");
    let post = instagram.fetch_blocking(request).unwrap();

    assert_eq!(post.id, "123_456");
    assert_eq!(post.kind, "image");
    assert_eq!(post.image_thumbnail.url, "http://x");
    assert_eq!(post.image_thumbnail.height, 150);
    assert!(!instagram.last_error().is_error());
}

#[tokio::test]
async fn blocking_call_inside_runtime_is_refused() {
    let root = start_mock_server();
    let mut instagram = Instagram::new(config(&root)).unwrap();

    let request = instagram.endpoints().tag_info("snow");
    let err = instagram.fetch_blocking(request).unwrap_err();
    assert_eq!(err, InstagramError::BlockingInRuntime);
    assert_eq!(instagram.last_response(), None);

    let request = instagram.endpoints().tag_info("snow");
    assert_eq!(instagram.fetch(request).await.unwrap().media_count, 7);
}

#[tokio::test]
async fn fetch_user_info() {
    let root = start_mock_server();
    let mut instagram = Instagram::new(config(&root)).unwrap();

    let request = instagram.endpoints().user_info("self");
    let user = instagram.fetch(request).await.unwrap();

    assert_eq!(user.id, "1574083");
    assert_eq!(user.username, "snoopdogg");
    assert_eq!(user.media_count, 1320);
    assert_eq!(user.following_count, 420);
    assert_eq!(user.follower_count, 3410);
    assert_eq!(instagram.last_error().code, "200");
}

#[tokio::test]
async fn pages_follow_next_url() {
    let root = start_mock_server();
    let mut instagram = Instagram::new(config(&root)).unwrap();

    let request = instagram.endpoints().popular_media();
    let pages: Vec<_> = instagram.pages(request, None).collect().await;

    assert_eq!(pages.len(), 2);
    let ids: Vec<String> = pages
        .into_iter()
        .flat_map(|page| page.unwrap().data)
        .map(|post| post.id)
        .collect();
    assert_eq!(ids, ["p1", "p2", "p3", "p4"]);
}

#[tokio::test]
async fn pages_respect_limit() {
    let root = start_mock_server();
    let mut instagram = Instagram::new(config(&root)).unwrap();

    let request = instagram.endpoints().popular_media();
    let pages: Vec<_> = instagram.pages(request, Some(1)).collect().await;

    assert_eq!(pages.len(), 1);
    let first = pages[0].as_ref().unwrap();
    assert_eq!(first.data.len(), 2);
    assert!(first.pagination.has_next());
    assert_eq!(first.pagination.next_max_id, "2");
}

#[tokio::test]
async fn dispatched_requests_resolve_independently() {
    let root = start_mock_server();
    let mut instagram = Instagram::new(config(&root)).unwrap();
    let names = Rc::new(RefCell::new(Vec::new()));

    for tag in ["snow", "rain"] {
        let sink = names.clone();
        let request = instagram.endpoints().tag_info(tag);
        instagram.dispatch_with(request, move |result| {
            let info = result.unwrap();
            sink.borrow_mut().push((info.name, info.media_count));
        });
    }
    assert_eq!(instagram.outstanding(), 2);
    instagram.run_until_idle().await;

    let mut names = names.borrow().clone();
    names.sort();
    assert_eq!(
        names,
        [("rain".to_owned(), 7), ("snow".to_owned(), 7)]
    );
    assert_eq!(instagram.outstanding(), 0);
}

#[tokio::test]
async fn invalid_token_reports_meta() {
    let root = start_mock_server();
    let config = Config::builder()
        .access_token("wrong")
        .api_root(root.as_str())
        .build();
    let mut instagram = Instagram::new(config).unwrap();

    let request = instagram.endpoints().tag_info("snow");
    let info = instagram.fetch(request).await.unwrap();

    assert_eq!(info, Default::default());
    let meta = instagram.last_error();
    assert!(meta.is_error());
    assert_eq!(meta.code, "400");
    assert_eq!(meta.error_type, "OAuthAccessTokenException");
    assert_eq!(meta.error_message, "The access_token provided is invalid.");
}

#[tokio::test]
async fn change_relationship_posts_action() {
    let root = start_mock_server();
    let mut instagram = Instagram::new(config(&root)).unwrap();

    let request = instagram.endpoints().relationship("1574083");
    let before = instagram.fetch(request).await.unwrap();
    assert_eq!(before.outgoing_status, "none");
    assert_eq!(before.incoming_status, "requested_by");

    let request = instagram
        .endpoints()
        .change_relationship("1574083", RelationshipAction::Follow);
    let after = instagram.fetch(request).await.unwrap();
    assert_eq!(
        after,
        Relationship {
            outgoing_status: "follows".to_owned(),
            incoming_status: "none".to_owned(),
        }
    );
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let config = config("http://127.0.0.1:1/v1/");
    let mut instagram = Instagram::new(config).unwrap();

    let request = instagram.endpoints().tag_info("snow");
    let err = instagram.fetch(request).await.unwrap_err();
    assert!(matches!(err, InstagramError::Network(_)));
    assert_eq!(instagram.last_response(), None);
}
