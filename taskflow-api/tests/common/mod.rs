//! Common test utilities for integration tests
//!
//! Every test gets its own router over a fresh in-memory store seeded with
//! the default column types, and a notifier that records outgoing mail.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use taskflow_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig, StoreBackend},
};
use taskflow_shared::{
    db::memory::MemoryStore,
    models::user::User,
    notify::MemoryNotifier,
    services::Services,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";

/// Seeded "To Do" column type
pub fn todo_type() -> Uuid {
    Uuid::from_u128(1)
}

/// Seeded "Done" column type
pub fn done_type() -> Uuid {
    Uuid::from_u128(3)
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
        },
        store: StoreBackend::Memory,
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "integration-test-secret-0123456789abcdef".to_string(),
            ttl_seconds: 3600,
        },
    }
}

/// A registered user with a valid token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Test context containing the router and its collaborators
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub notifier: MemoryNotifier,
}

impl TestContext {
    pub fn new() -> Self {
        let notifier = MemoryNotifier::new();
        let services = Services::new(Arc::new(MemoryStore::seeded()), Arc::new(notifier.clone()));
        let state = AppState::new(services, test_config());
        let app = build_router(state.clone());

        Self { app, state, notifier }
    }

    /// Registers `name@example.com` and issues a token for it
    pub async fn user(&self, name: &str) -> TestUser {
        let user = self
            .state
            .services
            .register(&format!("{}@example.com", name), PASSWORD, name, "Tester")
            .await
            .unwrap();
        let token = self.state.tokens.issue(&user.email).unwrap();
        TestUser { user, token }
    }

    /// Sends a request through the router and returns status and JSON body
    ///
    /// Empty bodies come back as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// Sends a prebuilt request
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, who: &TestUser) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(&who.token), None).await
    }

    pub async fn post(&self, uri: &str, who: &TestUser, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&who.token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, who: &TestUser, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(&who.token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, who: &TestUser) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(&who.token), None).await
    }

    /// Creates a board owned by `owner` and returns its id
    pub async fn board(&self, owner: &TestUser, name: &str) -> Uuid {
        let (status, body) = self
            .post("/api/projects", owner, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        id_of(&body)
    }

    /// Adds a column of `column_type_id` to a board and returns its id
    pub async fn column(&self, who: &TestUser, board_id: Uuid, column_type_id: Uuid, order: i32) -> Uuid {
        let (status, body) = self
            .post(
                "/api/columns",
                who,
                serde_json::json!({
                    "board_id": board_id,
                    "column_type_id": column_type_id,
                    "display_order": order,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        id_of(&body)
    }

    /// Creates a card in a column and returns its id
    pub async fn card(&self, who: &TestUser, column_id: Uuid, title: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/api/cards",
                who,
                serde_json::json!({ "column_id": column_id, "title": title }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        id_of(&body)
    }

    /// Invites `member` to a board as EDITOR
    pub async fn invite(&self, owner: &TestUser, board_id: Uuid, member: &TestUser) {
        let (status, body) = self
            .post(
                &format!("/api/projects/{}/members", board_id),
                owner,
                serde_json::json!({ "user_id": member.id(), "role": "EDITOR" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"].as_str().unwrap().parse().unwrap()
}
