#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use social_api::{AppState, Config, app, auth::create_token, models::NewGroup};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Builds an app from the given settings on top of test defaults.
    pub fn with_env(overrides: &[(&str, &str)]) -> Self {
        let mut vars = vec![
            ("JWT_SECRET", SECRET),
            ("BCRYPT_COST", "4"),
            ("WRITE_RATE_LIMIT_PER_SECOND", "0"),
        ];
        vars.extend_from_slice(overrides);
        let config = Config::from_lookup(|key| {
            vars.iter()
                .rev()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap();
        let state = AppState::new(config);
        let router = app(state.clone());
        Self { state, router }
    }

    /// Registers a user directly in the store and returns a bearer token.
    pub fn user(&self, username: &str) -> String {
        let user = self
            .state
            .store
            .insert_user(username, None, "unused".into())
            .unwrap();
        create_token(&user, SECRET, 1).unwrap()
    }

    pub fn group(&self, slug: &str) -> i64 {
        self.state
            .store
            .insert_group(NewGroup {
                title: slug.to_uppercase(),
                slug: slug.into(),
                description: format!("all about {slug}"),
            })
            .unwrap()
            .id
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// Creates a post as `token` and returns its id.
    pub async fn create_post(&self, token: &str, text: &str) -> i64 {
        let (status, body) = self
            .post("/api/v1/posts/", Some(token), serde_json::json!({ "text": text }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn create_comment(&self, token: &str, post_id: i64, text: &str) -> i64 {
        let (status, body) = self
            .post(
                &format!("/api/v1/posts/{post_id}/comments/"),
                Some(token),
                serde_json::json!({ "text": text }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}
