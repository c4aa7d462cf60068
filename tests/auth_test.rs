/*!
 * Account and Session Integration Tests
 *
 * Registration, login and logout over HTTP, including the form errors
 * shown for rejected registrations and credentials.
 *
 * Test Categories:
 * - Registration validation (taken names, password rules)
 * - Login (bad credentials, welcome flash)
 * - Logout (session rotation, login wall afterwards)
 * - Infrastructure failures during registration
 */

mod common;

use axum::http::StatusCode;
use common::*;
use ggfm_records::auth::get_account_by_username;

fn registration(username: &str, password1: &str, password2: &str) -> String {
    format!(
        "username={}&email=&password1={}&password2={}",
        username, password1, password2
    )
}

async fn login(app: &axum::Router, username: &str, password: &str) -> axum::http::Response<axum::body::Body> {
    post_form(
        app,
        "/ggfm/login/",
        &format!("username={}&password={}", username, password),
        None,
    )
    .await
}

#[tokio::test]
async fn register_page_renders_form() {
    let (app, _db, _temp_dir) = setup_test_app().await;

    let response = get(&app, "/ggfm/register/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains(r#"name="password1""#));
    assert!(page.contains(r#"name="password2""#));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (app, db, _temp_dir) = setup_test_app().await;
    register(&app, "alice").await;

    let response = post_form(
        &app,
        "/ggfm/register/",
        &registration("alice", TEST_PASSWORD, TEST_PASSWORD),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("username: A user with that username already exists."));

    let account = get_account_by_username(&db, "alice").await.unwrap();
    assert!(account.is_some());
}

#[tokio::test]
async fn password_rules_are_enforced() {
    let (app, db, _temp_dir) = setup_test_app().await;

    let cases = [
        (
            registration("mismatch", TEST_PASSWORD, "something-else-entirely"),
            "password2: The two password fields didn&#x27;t match.",
        ),
        (
            registration("short", "abc123", "abc123"),
            "password2: This password is too short. It must contain at least 8 characters.",
        ),
        (
            registration("numeric", "1234567890", "1234567890"),
            "password2: This password is entirely numeric.",
        ),
        (
            registration("bad+name%21", TEST_PASSWORD, TEST_PASSWORD),
            "username: Enter a valid username.",
        ),
        (
            registration("", TEST_PASSWORD, TEST_PASSWORD),
            "username: This field is required.",
        ),
    ];

    for (body, message) in cases {
        let response = post_form(&app, "/ggfm/register/", &body, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", body);
        assert!(body_text(response).await.contains(message), "{}", message);
    }

    for username in ["mismatch", "short", "numeric", "bad name!"] {
        assert!(get_account_by_username(&db, username).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let (app, _db, _temp_dir) = setup_test_app().await;

    let body = format!(
        "username=carol&email=not-an-email&password1={}&password2={}",
        TEST_PASSWORD, TEST_PASSWORD
    );
    let response = post_form(&app, "/ggfm/register/", &body, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("email: Enter a valid email address."));
}

#[tokio::test]
async fn wrong_password_re_renders_login() {
    let (app, _db, _temp_dir) = setup_test_app().await;
    register(&app, "alice").await;

    let response = login(&app, "alice", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Invalid username or password."));
    // the submitted username is kept
    assert!(page.contains(r#"value="alice""#));

    let response = login(&app, "nobody", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Invalid username or password."));
}

#[tokio::test]
async fn login_redirects_to_dashboard_with_welcome() {
    let (app, _db, _temp_dir) = setup_test_app().await;
    register(&app, "alice").await;

    let response = login(&app, "alice", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/ggfm/dashboard/");
    let cookie = session_cookie(&response).expect("login sets a session cookie");

    let dashboard = get(&app, "/ggfm/dashboard/", Some(&cookie)).await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    let page = body_text(dashboard).await;
    assert!(page.contains("Welcome back, alice!"));

    // messages are shown once
    let again = body_text(get(&app, "/ggfm/dashboard/", Some(&cookie)).await).await;
    assert!(!again.contains("Welcome back, alice!"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (app, _db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;

    let response = post_form(&app, "/ggfm/logout/", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");

    let fresh = session_cookie(&response).expect("logout issues a new session cookie");
    assert_ne!(fresh, cookie);

    let home = body_text(get(&app, "/", Some(&fresh)).await).await;
    assert!(home.contains("You have been logged out."));

    for session in [&cookie, &fresh] {
        let response = get(&app, "/ggfm/dashboard/", Some(session)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/ggfm/login/");
    }
}

#[tokio::test]
async fn logout_requires_login() {
    let (app, _db, _temp_dir) = setup_test_app().await;

    let response = get(&app, "/ggfm/logout/", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/ggfm/login/");
}

#[tokio::test]
async fn registration_storage_failure_is_a_server_error() {
    let (app, db, _temp_dir) = setup_test_app().await;
    db.write()
        .await
        .execute("DROP TABLE users", ())
        .await
        .unwrap();

    let response = post_form(
        &app,
        "/ggfm/register/",
        &registration("alice", TEST_PASSWORD, TEST_PASSWORD),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("Server Error"));
}
