use crate::helpers::{
    app::{TEST_PUBLIC_URL, empty_request, get_json_body, json_request},
    make_test_app, make_test_app_with_failing_mail,
};
use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

// --- registration ---

#[tokio::test]
#[serial]
async fn register_success_sends_verification_email() {
    let t = make_test_app().await;

    let payload = json!({
        "name": "Ada",
        "email": "ada@example.com",
        "password": "secret1",
        "subscription": "pro"
    });
    let response = t
        .send(json_request("POST", "/api/users/signup", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_json_body(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["code"], 201);

    let data = &json["data"];
    assert_eq!(data["name"], "Ada");
    assert_eq!(data["email"], "ada@example.com");
    assert_eq!(data["subscription"], "pro");
    assert_eq!(data["isSendVerification"], true);
    assert!(data["avatarUrl"].as_str().unwrap().starts_with("https://www.gravatar.com/avatar/"));

    let stored = t.find_user(data["id"].as_i64().unwrap()).await;
    let verification_token = stored.verification_token.expect("pending token");
    assert!(!stored.verify);

    let sent = t.transactional.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert!(sent[0].text.contains(&format!(
        "{TEST_PUBLIC_URL}/api/users/verify/{verification_token}"
    )));
    assert!(t.relay.sent().is_empty());
}

#[tokio::test]
#[serial]
async fn register_response_never_leaks_tokens() {
    let t = make_test_app().await;

    let payload = json!({"email": "leak@example.com", "password": "secret1"});
    let response = t
        .send(json_request("POST", "/api/users/signup", None, &payload))
        .await;
    let json = get_json_body(response).await;

    let data = json["data"].as_object().unwrap();
    assert!(!data.contains_key("verificationToken"));
    assert!(!data.contains_key("verification_token"));
    assert!(!data.contains_key("token"));
    assert!(!data.contains_key("password"));

    let stored = t.find_user(json["data"]["id"].as_i64().unwrap()).await;
    let token = stored.verification_token.unwrap();
    assert!(!json.to_string().contains(&token));
}

#[tokio::test]
#[serial]
async fn register_defaults_name_and_subscription() {
    let t = make_test_app().await;

    let payload = json!({"email": "Grace.Hopper@Example.com", "password": "secret1"});
    let response = t
        .send(json_request("POST", "/api/users/signup", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_json_body(response).await;
    assert_eq!(json["data"]["name"], "grace.hopper");
    assert_eq!(json["data"]["email"], "grace.hopper@example.com");
    assert_eq!(json["data"]["subscription"], "starter");
}

#[tokio::test]
#[serial]
async fn register_duplicate_email_is_conflict() {
    let t = make_test_app().await;
    t.create_user("dup@example.com", "secret1").await;

    let payload = json!({"email": "dup@example.com", "password": "another1"});
    let response = t
        .send(json_request("POST", "/api/users/signup", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = get_json_body(response).await;
    assert_eq!(
        json,
        json!({"status": "error", "code": 409, "message": "Email in use"})
    );

    assert_eq!(t.user_count().await, 1);
    assert!(t.transactional.sent().is_empty());
}

#[tokio::test]
#[serial]
async fn register_with_mail_down_still_creates_account() {
    let t = make_test_app_with_failing_mail().await;

    let payload = json!({"email": "offline@example.com", "password": "secret1"});
    let response = t
        .send(json_request("POST", "/api/users/signup", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_json_body(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["isSendVerification"], false);
    assert_eq!(t.user_count().await, 1);
}

#[tokio::test]
#[serial]
async fn register_invalid_email_is_bad_request() {
    let t = make_test_app().await;

    let payload = json!({"email": "not-an-email", "password": "secret1"});
    let response = t
        .send(json_request("POST", "/api/users/signup", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_json_body(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], 400);
    assert!(json["message"].as_str().unwrap().contains("Invalid email format"));
    assert_eq!(t.user_count().await, 0);
}

#[tokio::test]
#[serial]
async fn register_short_password_is_bad_request() {
    let t = make_test_app().await;

    let payload = json!({"email": "short@example.com", "password": "12345"});
    let response = t
        .send(json_request("POST", "/api/users/signup", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_json_body(response).await;
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .contains("Password must be at least 6 characters")
    );
}

#[tokio::test]
#[serial]
async fn register_malformed_json_is_bad_request() {
    let t = make_test_app().await;

    let response = t
        .send(json_request("POST", "/api/users/signup", None, &json!({"email": 42})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_json_body(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], 400);
}

// --- login ---

#[tokio::test]
#[serial]
async fn login_success_persists_token() {
    let t = make_test_app().await;
    let user = t.create_user("login@example.com", "secret1").await;

    let payload = json!({"email": "login@example.com", "password": "secret1"});
    let response = t
        .send(json_request("POST", "/api/users/login", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["code"], 200);
    assert_eq!(json["data"]["user"], json!({"email": "login@example.com", "subscription": "starter"}));

    let token = json["data"]["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert_eq!(t.find_user(user.id).await.token.as_deref(), Some(token));
}

#[tokio::test]
#[serial]
async fn login_wrong_password_is_unauthorized() {
    let t = make_test_app().await;
    let user = t.create_user("wrong@example.com", "secret1").await;

    let payload = json!({"email": "wrong@example.com", "password": "nope-nope"});
    let response = t
        .send(json_request("POST", "/api/users/login", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_json_body(response).await;
    assert_eq!(
        json,
        json!({"status": "error", "code": 401, "message": "Email or password is wrong"})
    );
    assert!(t.find_user(user.id).await.token.is_none());
}

#[tokio::test]
#[serial]
async fn login_unknown_email_is_unauthorized() {
    let t = make_test_app().await;

    let payload = json!({"email": "ghost@example.com", "password": "secret1"});
    let response = t
        .send(json_request("POST", "/api/users/login", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Email or password is wrong");
}

#[tokio::test]
#[serial]
async fn login_again_replaces_previous_session() {
    let t = make_test_app().await;
    t.create_user("twice@example.com", "secret1").await;

    let first = t.login("twice@example.com", "secret1").await;
    let second = t.login("twice@example.com", "secret1").await;
    assert_ne!(first, second);

    let stale = t
        .send(empty_request("GET", "/api/users/current", Some(&first)))
        .await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    let fresh = t
        .send(empty_request("GET", "/api/users/current", Some(&second)))
        .await;
    assert_eq!(fresh.status(), StatusCode::OK);
}

// --- logout ---

#[tokio::test]
#[serial]
async fn logout_clears_session() {
    let t = make_test_app().await;
    let user = t.create_user("bye@example.com", "secret1").await;
    let token = t.login("bye@example.com", "secret1").await;

    let response = t
        .send(empty_request("POST", "/api/users/logout", Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
    assert!(t.find_user(user.id).await.token.is_none());

    let after = t
        .send(empty_request("GET", "/api/users/current", Some(&token)))
        .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn logout_without_token_is_unauthorized() {
    let t = make_test_app().await;

    let response = t.send(empty_request("POST", "/api/users/logout", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_json_body(response).await;
    assert_eq!(
        json,
        json!({"status": "error", "code": 401, "message": "Not authorized"})
    );
}

// --- resend verification ---

#[tokio::test]
#[serial]
async fn resend_verification_for_pending_account() {
    let t = make_test_app().await;
    let user = t.create_user("pending@example.com", "secret1").await;

    let payload = json!({"email": "pending@example.com"});
    let response = t
        .send(json_request("POST", "/api/users/verify", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(
        json,
        json!({
            "status": "success",
            "code": 200,
            "data": {"message": "Verification email sent", "isSendVerification": true}
        })
    );

    let sent = t.relay.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains(&user.verification_token.unwrap()));
    assert!(t.transactional.sent().is_empty());
}

#[tokio::test]
#[serial]
async fn resend_verification_reports_delivery_failure() {
    let t = make_test_app_with_failing_mail().await;
    t.create_user("pending@example.com", "secret1").await;

    let payload = json!({"email": "pending@example.com"});
    let response = t
        .send(json_request("POST", "/api/users/verify", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(json["data"]["isSendVerification"], false);
}

#[tokio::test]
#[serial]
async fn resend_verification_for_verified_account_is_bad_request() {
    let t = make_test_app().await;
    let user = t.create_user("done@example.com", "secret1").await;
    let token = user.verification_token.unwrap();
    assert!(t.state.auth().is_token_verified(&token).await.unwrap());

    let payload = json!({"email": "done@example.com"});
    let response = t
        .send(json_request("POST", "/api/users/verify", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_json_body(response).await;
    assert_eq!(json, json!({"status": "error", "code": 400}));
    assert!(t.relay.sent().is_empty());
}

#[tokio::test]
#[serial]
async fn resend_verification_for_unknown_email_looks_the_same() {
    let t = make_test_app().await;

    let payload = json!({"email": "nobody@example.com"});
    let response = t
        .send(json_request("POST", "/api/users/verify", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_json_body(response).await;
    assert_eq!(json, json!({"status": "error", "code": 400}));
}
