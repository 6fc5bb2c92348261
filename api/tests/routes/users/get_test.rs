use crate::helpers::{
    app::{empty_request, get_json_body},
    make_test_app,
};
use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

// --- current user ---

#[tokio::test]
#[serial]
async fn current_returns_email_and_subscription() {
    let t = make_test_app().await;
    t.create_user("me@example.com", "secret1").await;
    let token = t.login("me@example.com", "secret1").await;

    let response = t
        .send(empty_request("GET", "/api/users/current", Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(
        json,
        json!({
            "status": "success",
            "code": 200,
            "data": {"email": "me@example.com", "subscription": "starter"}
        })
    );
}

#[tokio::test]
#[serial]
async fn current_without_token_is_unauthorized() {
    let t = make_test_app().await;

    let response = t.send(empty_request("GET", "/api/users/current", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_json_body(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Not authorized");
}

#[tokio::test]
#[serial]
async fn current_with_garbage_token_is_unauthorized() {
    let t = make_test_app().await;

    let response = t
        .send(empty_request("GET", "/api/users/current", Some("not.a.jwt")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn current_with_token_never_stored_is_unauthorized() {
    let t = make_test_app().await;
    let user = t.create_user("forged@example.com", "secret1").await;
    let token = t.state.auth().issue_token(&user).unwrap();

    let response = t
        .send(empty_request("GET", "/api/users/current", Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// --- email verification ---

#[tokio::test]
#[serial]
async fn verify_marks_account_verified_once() {
    let t = make_test_app().await;
    let user = t.create_user("verify@example.com", "secret1").await;
    let uri = format!("/api/users/verify/{}", user.verification_token.unwrap());

    let response = t.send(empty_request("GET", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(
        json,
        json!({
            "status": "success",
            "code": 200,
            "data": {"message": "email verified successful"}
        })
    );

    let stored = t.find_user(user.id).await;
    assert!(stored.verify);
    assert!(stored.verification_token.is_none());

    let again = t.send(empty_request("GET", &uri, None)).await;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);

    let json = get_json_body(again).await;
    assert_eq!(
        json,
        json!({
            "status": "error",
            "code": 400,
            "data": {"message": "Invalid token"}
        })
    );
}

#[tokio::test]
#[serial]
async fn verify_unknown_token_is_bad_request() {
    let t = make_test_app().await;
    let user = t.create_user("other@example.com", "secret1").await;

    let response = t
        .send(empty_request("GET", "/api/users/verify/does-not-exist", None))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_json_body(response).await;
    assert_eq!(json["data"]["message"], "Invalid token");
    assert!(!t.find_user(user.id).await.verify);
}
