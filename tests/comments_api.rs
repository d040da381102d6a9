mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn comments_of_missing_post_are_not_found() {
    let app = TestApp::new();
    let alice = app.user("alice");

    let (status, _) = app.get("/api/v1/posts/999/comments/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/v1/posts/999/comments/", Some(&alice), json!({"text": "hi"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_binds_post_and_author_from_context() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let post = app.create_post(&alice, "p").await;
    let other = app.create_post(&alice, "q").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/posts/{post}/comments/"),
            Some(&bob),
            json!({"text": "nice", "post": other, "author": "alice"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post"], post);
    assert_eq!(body["author"], "bob");
    assert_eq!(body["text"], "nice");
    assert!(body["created"].is_string());

    let (_, post_body) = app.get(&format!("/api/v1/posts/{post}/"), None).await;
    assert_eq!(post_body["comments"][0]["text"], "nice");
}

#[tokio::test]
async fn comments_are_listed_in_creation_order() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let post = app.create_post(&alice, "p").await;
    for text in ["a", "b", "c"] {
        app.create_comment(&alice, post, text).await;
    }

    let (status, body) = app.get(&format!("/api/v1/posts/{post}/comments/"), None).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, ["a", "b", "c"]);
}

#[tokio::test]
async fn comment_under_another_posts_path_is_not_found() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let post = app.create_post(&alice, "p").await;
    let other = app.create_post(&alice, "q").await;
    let comment = app.create_comment(&alice, post, "c").await;
    let wrong = format!("/api/v1/posts/{other}/comments/{comment}/");

    let (status, _) = app.get(&wrong, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .send(Method::PATCH, &wrong, Some(&alice), Some(json!({"text": "x"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send(Method::DELETE, &wrong, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .get(&format!("/api/v1/posts/{post}/comments/{comment}/"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "c");
}

#[tokio::test]
async fn only_author_may_modify_comment() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let post = app.create_post(&alice, "p").await;
    let comment = app.create_comment(&bob, post, "bob's").await;
    let detail = format!("/api/v1/posts/{post}/comments/{comment}/");

    // the post author is not the comment author
    for method in [Method::PUT, Method::PATCH] {
        let (status, _) = app
            .send(method, &detail, Some(&alice), Some(json!({"text": "edited"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    let (status, _) = app.send(Method::DELETE, &detail, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::DELETE, &detail, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = app.get(&detail, None).await;
    assert_eq!(body["text"], "bob's");

    let (status, body) = app
        .send(Method::PUT, &detail, Some(&bob), Some(json!({"text": "better"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "better");

    let (status, _) = app.send(Method::DELETE, &detail, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&detail, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_comment_is_unauthorized() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let post = app.create_post(&alice, "p").await;

    let (status, _) = app
        .post(&format!("/api/v1/posts/{post}/comments/"), None, json!({"text": "x"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let comment = app.create_comment(&alice, post, "kept").await;
    let uri = format!("/api/v1/posts/{post}/comments/{comment}/");
    for method in [Method::PUT, Method::PATCH] {
        let (status, _) = app
            .send(method.clone(), &uri, None, Some(json!({"text": "hijack"})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method}");
    }
    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "kept");
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let post = app.create_post(&alice, "p").await;

    let (status, body) = app
        .post(&format!("/api/v1/posts/{post}/comments/"), Some(&alice), json!({"text": " "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"text": ["This field may not be blank."]}));
}
