//! End-to-end tests for registration, login and the token lifecycle

mod common;

use common::spawn_app;
use serde_json::{json, Value};

// --- Registration Tests ---

#[tokio::test]
async fn create_user_returns_201_without_password() {
    let app = spawn_app().await;

    let response = app.create_user("saul@bettercall.com", "123456").await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "saul@bettercall.com");
    assert_eq!(body["is_chirpy_red"], false);
    assert!(body["id"].as_str().is_some());
    assert!(body["created_at"].as_str().is_some());
    assert!(body["updated_at"].as_str().is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn create_user_rejects_duplicate_email() {
    let app = spawn_app().await;

    assert_eq!(app.create_user("saul@bettercall.com", "123456").await.status().as_u16(), 201);
    let response = app.create_user("saul@bettercall.com", "other").await;

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn create_user_returns_400_for_invalid_input() {
    let app = spawn_app().await;
    let long_password = "x".repeat(73);
    let test_cases = vec![
        ("not-an-email", "123456", "invalid email"),
        ("saul@bettercall.com", "", "empty password"),
        ("saul@bettercall.com", long_password.as_str(), "password over 72 bytes"),
    ];

    for (email, password, description) in test_cases {
        let response = app.create_user(email, password).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request for {}.",
            description
        );
    }
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/users"))
        .header("Content-Type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_user_and_token_pair() {
    let app = spawn_app().await;
    let created: Value = app
        .create_user("saul@bettercall.com", "123456")
        .await
        .json()
        .await
        .unwrap();

    let response = app.login("saul@bettercall.com", "123456").await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["email"], "saul@bettercall.com");
    assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
    let refresh_token = body["refresh_token"].as_str().unwrap();
    assert_eq!(refresh_token.len(), 64);
    assert!(refresh_token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app().await;
    app.create_user("saul@bettercall.com", "123456").await;

    let wrong_password = app.login("saul@bettercall.com", "wrong").await;
    let unknown_email = app.login("kim@wexler.com", "123456").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["code"], "AUTHENTICATION_FAILED");
    assert_eq!(a["code"], b["code"]);
    assert_eq!(a["message"], b["message"]);
}

// --- Token Lifecycle Tests ---

#[tokio::test]
async fn refresh_mints_access_tokens_until_revoked() {
    let app = spawn_app().await;
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    for _ in 0..2 {
        let response = app.refresh(refresh_token).await;
        assert_eq!(200, response.status().as_u16());

        let body: Value = response.json().await.unwrap();
        let token = body["token"].as_str().unwrap();
        assert_eq!(app.post_chirp(token, "still here").await.status().as_u16(), 201);
    }

    assert_eq!(204, app.revoke(refresh_token).await.status().as_u16());

    let response = app.refresh(refresh_token).await;
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn access_token_outlives_revoked_refresh_token() {
    let app = spawn_app().await;
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;

    app.revoke(session["refresh_token"].as_str().unwrap()).await;

    let response = app
        .post_chirp(session["token"].as_str().unwrap(), "revocation only stops renewal")
        .await;
    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn revoking_twice_returns_401() {
    let app = spawn_app().await;
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    assert_eq!(204, app.revoke(refresh_token).await.status().as_u16());
    assert_eq!(401, app.revoke(refresh_token).await.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_missing_and_unknown_tokens() {
    let app = spawn_app().await;
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;

    let missing = app
        .client
        .post(app.url("/api/refresh"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, missing.status().as_u16());

    let unknown = app.refresh(&"0".repeat(64)).await;
    assert_eq!(401, unknown.status().as_u16());

    // an access token is not a refresh token
    let wrong_kind = app.refresh(session["token"].as_str().unwrap()).await;
    assert_eq!(401, wrong_kind.status().as_u16());
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let app = spawn_app().await;
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;

    let response = app
        .post_chirp(session["refresh_token"].as_str().unwrap(), "hello")
        .await;
    assert_eq!(401, response.status().as_u16());
}

// --- Account Update Tests ---

#[tokio::test]
async fn update_user_changes_password() {
    let app = spawn_app().await;
    let session = app.signed_in_user("walt@breakingbad.com", "123456").await;

    let response = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth(session["token"].as_str().unwrap())
        .json(&json!({ "email": "walt@breakingbad.com", "password": "losPollos" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], session["id"]);
    assert_eq!(body["email"], "walt@breakingbad.com");
    assert!(body.get("hashed_password").is_none());

    assert_eq!(401, app.login("walt@breakingbad.com", "123456").await.status().as_u16());
    assert_eq!(
        200,
        app.login("walt@breakingbad.com", "losPollos")
            .await
            .status()
            .as_u16()
    );
}

#[tokio::test]
async fn update_user_rejects_email_of_someone_else() {
    let app = spawn_app().await;
    let walt = app.signed_in_user("walt@breakingbad.com", "123456").await;
    app.create_user("jesse@breakingbad.com", "yo123456").await;

    for email in ["heisenberg@breakingbad.com", "jesse@breakingbad.com"] {
        let response = app
            .client
            .put(app.url("/api/users"))
            .bearer_auth(walt["token"].as_str().unwrap())
            .json(&json!({ "email": email, "password": "losPollos" }))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(401, response.status().as_u16(), "email: {}", email);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    // both accounts keep their passwords
    assert_eq!(200, app.login("walt@breakingbad.com", "123456").await.status().as_u16());
    assert_eq!(200, app.login("jesse@breakingbad.com", "yo123456").await.status().as_u16());
}

#[tokio::test]
async fn update_user_requires_access_token() {
    let app = spawn_app().await;
    app.create_user("walt@breakingbad.com", "123456").await;

    let test_cases = vec![None, Some("not-a-token")];

    for token in test_cases {
        let mut request = app
            .client
            .put(app.url("/api/users"))
            .json(&json!({ "email": "walt@breakingbad.com", "password": "654321" }));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.expect("Failed to execute request.");

        assert_eq!(401, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    assert_eq!(200, app.login("walt@breakingbad.com", "123456").await.status().as_u16());
}
