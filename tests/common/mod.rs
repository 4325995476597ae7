//! Common test utilities and helpers.

#![allow(dead_code)]

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use outreach::config::Config;
use outreach::db::{self, CreateUser, UserRole};
use outreach::services::hash_password;
use outreach::{api, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.org";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

/// A running test app. Keeps the storage directory alive for the test.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub storage: TempDir,
}

/// Build the app over an in-memory database and a temporary storage root.
pub async fn build_app() -> TestApp {
    build_app_with(|_| {}).await
}

/// Like [`build_app`], with a hook to adjust configuration first.
pub async fn build_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let storage = tempfile::tempdir().expect("Failed to create storage dir");
    let mut config = Config::for_tests(storage.path());
    configure(&mut config);

    let state = AppState::new(config).await.expect("Failed to build state");
    seed_admin(&state).await;

    let app = router(state.clone());
    let server = TestServer::new(app).expect("Failed to start test server");

    TestApp {
        server,
        state,
        storage,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().merge(api::routes(state.clone())).with_state(state)
}

async fn seed_admin(state: &AppState) {
    db::create_user(
        &state.db,
        CreateUser {
            name: "Site Admin".into(),
            email: ADMIN_EMAIL.into(),
            password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
            role: UserRole::Admin,
        },
    )
    .await
    .expect("Failed to create admin");
}

/// Log in as the seeded admin and return the access token.
pub async fn login(server: &TestServer) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["access_token"]
        .as_str()
        .expect("access_token missing")
        .to_string()
}

/// Helper function to create a Bearer Authorization header value
pub fn bearer_auth(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (AUTHORIZATION, bearer_auth(token))
}
