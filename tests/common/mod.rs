#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use ggfm_records::config::Config;
use ggfm_records::database::{Db, init_db};
use ggfm_records::routes;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

pub const TEST_SESSION_SECRET: &str =
    "test-session-secret-0123456789abcdef0123456789abcdef0123456789abcdef";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub async fn setup_test_environment() -> (Db, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();

    let db = init_db(&data_path)
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize database at {}: {}", data_path, e));

    (db, temp_dir)
}

pub fn test_config(data_path: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: "0".to_string(),
        data_path: data_path.to_string(),
        session_secret: TEST_SESSION_SECRET.to_string(),
        session_secure: false,
    }
}

pub async fn setup_test_app() -> (Router, Db, TempDir) {
    let (db, temp_dir) = setup_test_environment().await;
    let config = test_config(temp_dir.path().to_str().expect("utf-8 temp path"));
    let app = routes::app(db.clone(), &config).expect("Failed to build application");
    (app, db, temp_dir)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn get(app: &Router, path: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).expect("valid request")).await
}

pub async fn post_form(
    app: &Router,
    path: &str,
    body: &str,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body.to_string())).expect("valid request")).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body is utf-8")
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// The `name=value` part of the session cookie set by `response`.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("ggfm_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Registers `username` through the HTTP form and returns the logged-in
/// session cookie.
pub async fn register(app: &Router, username: &str) -> String {
    let body = format!(
        "username={}&email={}%40example.org&password1={}&password2={}",
        username, username, TEST_PASSWORD, TEST_PASSWORD
    );
    let response = post_form(app, "/ggfm/register/", &body, None).await;
    assert_eq!(response.status(), StatusCode::FOUND, "registration of {} failed", username);
    assert_eq!(location(&response), "/ggfm/dashboard/");
    session_cookie(&response).expect("registration sets a session cookie")
}

pub async fn account_id(db: &Db, username: &str) -> i64 {
    ggfm_records::auth::get_account_by_username(db, username)
        .await
        .expect("account lookup")
        .unwrap_or_else(|| panic!("no account named {}", username))
        .id
}
