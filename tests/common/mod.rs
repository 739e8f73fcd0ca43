#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use storefront_api::app::{router, AppState};
use storefront_api::config::AppConfig;
use storefront_api::database::models::{CreateUser, User, UserRole};
use storefront_api::database::Database;
use storefront_api::rate_limit::LoginRateLimiter;

pub const ADMIN_EMAIL: &str = "owner@shop.mx";
pub const ADMIN_PASSWORD: &str = "correct-horse";

/// In-process server backed by a private in-memory database.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub db: Database,
    pub config: AppConfig,
    pub client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Development defaults with a cheap bcrypt cost and quiet logging.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = 4;
    config.api.enable_request_logging = false;
    config
}

pub async fn spawn() -> Result<TestServer> {
    spawn_with(test_config(), None).await
}

pub async fn spawn_with(config: AppConfig, limiter: Option<LoginRateLimiter>) -> Result<TestServer> {
    let db = Database::connect_in_memory().await?;
    db.migrate().await?;

    let state = match limiter {
        Some(limiter) => AppState::with_limiter(db.clone(), config.clone(), limiter),
        None => AppState::new(db.clone(), config.clone()),
    };

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    let app = router(state);
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let server = TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        db,
        config,
        client: reqwest::Client::new(),
        handle,
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn seed_user(&self, email: &str, password: &str, role: UserRole, active: bool) -> Result<User> {
        let user = self
            .db
            .users(self.config.security.bcrypt_cost)
            .create(CreateUser {
                email: email.to_string(),
                name: None,
                password: password.to_string(),
                role,
                is_active: if active { 1 } else { 0 },
            })
            .await?;
        Ok(user)
    }

    pub async fn seed_admin(&self) -> Result<User> {
        self.seed_user(ADMIN_EMAIL, ADMIN_PASSWORD, UserRole::Admin, true).await
    }

    pub async fn login_raw(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Logs in and returns the `name=value` pair to send back as `Cookie`.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let resp = self.login_raw(email, password).await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());
        session_cookie(&resp, &self.config.security.session_cookie_name).context("login did not set a session cookie")
    }

    /// Seeds the default admin and returns its session cookie.
    pub async fn admin_session(&self) -> Result<String> {
        self.seed_admin().await?;
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }
}

/// Attaches a session cookie to a request.
pub fn with_session(request: RequestBuilder, cookie: &str) -> RequestBuilder {
    request.header(COOKIE, cookie)
}

/// Finds `name` among the response's `Set-Cookie` headers, as `name=value`.
pub fn session_cookie(resp: &Response, name: &str) -> Option<String> {
    set_cookie_header(resp, name).and_then(|raw| raw.split(';').next().map(str::to_string))
}

/// Raw `Set-Cookie` header for `name`, attributes included.
pub fn set_cookie_header(resp: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

/// Parses the envelope and asserts on `success`.
pub async fn json_body(resp: Response, success: bool) -> Result<Value> {
    let body = resp.json::<Value>().await?;
    assert_eq!(body["success"], success, "unexpected envelope: {}", body);
    Ok(body)
}
