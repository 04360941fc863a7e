#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory database with migrations applied
/// - A router built with test configuration
/// - A browser-like client that keeps cookies between requests
/// - Form encoding and CSRF token helpers

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use taskdesk_shared::auth::csrf;
use taskdesk_shared::auth::password::HashingParams;
use taskdesk_shared::db::migrations::run_migrations;
use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
use taskdesk_web::app::{build_router, AppState};
use taskdesk_web::config::{
    Config, DatabaseSettings, DisplayConfig, ServerConfig, SessionConfig,
};
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_PASSWORD: &str = "Passw0rd";

/// Nonce every test client presents, so form tokens are known up front
pub const TEST_NONCE: &str = "abababababababababababababababababababababababababababababababab";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_production(false).await
    }

    /// Like `new`, with production cookies and HSTS switched on
    pub async fn with_production(production: bool) -> anyhow::Result<Self> {
        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                production,
            },
            database: DatabaseSettings {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            session: SessionConfig {
                secret: TEST_SECRET.to_string(),
                ttl_hours: 24,
            },
            hashing: HashingParams::insecure_fast(),
            display: DisplayConfig::default(),
        };

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// A client with a CSRF nonce cookie and no session
    pub fn client(&self) -> TestClient {
        let mut jar = BTreeMap::new();
        jar.insert("taskdesk_csrf".to_string(), TEST_NONCE.to_string());

        TestClient {
            app: self.app.clone(),
            jar,
        }
    }

    /// Registers and logs in a fresh client
    pub async fn logged_in(&self, username: &str) -> TestClient {
        let mut client = self.client();

        let response = client
            .post_form(
                "/register",
                &[
                    ("username", username),
                    ("password", TEST_PASSWORD),
                    ("confirm_password", TEST_PASSWORD),
                ],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "register failed: {}", response.body);

        let response = client
            .post_form(
                "/login",
                &[("username", username), ("password", TEST_PASSWORD)],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "login failed: {}", response.body);
        assert!(client.cookie("taskdesk_session").is_some());

        client
    }

    /// Id of the most recent task with this title
    pub async fn task_id(&self, title: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM tasks WHERE title = ? ORDER BY id DESC LIMIT 1")
            .bind(title)
            .fetch_one(&self.db)
            .await
            .expect("task not found")
    }

    pub async fn task_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.db)
            .await
            .unwrap()
    }
}

/// Response with the body read into a string
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

/// Sends requests through the router the way a browser would
pub struct TestClient {
    app: Router,
    jar: BTreeMap<String, String>,
}

impl TestClient {
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(String::as_str)
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.jar.insert(name.to_string(), value.to_string());
    }

    pub fn remove_cookie(&mut self, name: &str) {
        self.jar.remove(name);
    }

    /// Token matching the nonce this client currently holds
    pub fn csrf_token(&self) -> String {
        let nonce = self.cookie("taskdesk_csrf").unwrap_or(TEST_NONCE);
        csrf::token_for(TEST_SECRET, nonce)
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Posts a form with this client's CSRF token added
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let token = self.csrf_token();
        let mut all: Vec<(&str, &str)> = fields.to_vec();
        all.push(("csrf_token", &token));

        self.post_raw(uri, &encode_form(&all)).await
    }

    /// Posts an already encoded body as-is
    pub async fn post_raw(&mut self, uri: &str, body: &str) -> TestResponse {
        self.post_bytes(uri, "application/x-www-form-urlencoded", body.as_bytes())
            .await
    }

    /// Posts arbitrary bytes under the given content type
    pub async fn post_bytes(&mut self, uri: &str, content_type: &str, body: &[u8]) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_vec()))
            .unwrap();

        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if !self.jar.is_empty() {
            let cookie = self
                .jar
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let response = TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        };

        for set_cookie in response.set_cookies() {
            self.store(&set_cookie);
        }

        response
    }

    fn store(&mut self, set_cookie: &str) {
        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };

        let expired = parts.any(|attr| attr.trim().eq_ignore_ascii_case("Max-Age=0"));
        if expired {
            self.jar.remove(name.trim());
        } else {
            self.jar.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
}

/// `application/x-www-form-urlencoded` body
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_component(text: &str) -> String {
    let mut out = String::new();
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
