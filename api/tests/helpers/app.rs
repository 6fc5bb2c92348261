use super::mail::RecordingSender;
use api::{
    routes::build_app,
    state::{AVATAR_URL_PREFIX, AppState, Mailers},
};
use axum::{
    Router,
    body::Body,
    http::{
        Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::Response,
};
use db::{
    models::user::{self, Model as UserModel},
    test_utils::setup_test_db,
};
use sea_orm::EntityTrait;
use serde_json::{Value, json};
use services::{
    auth_service::{AuthService, CreateUser, TokenSettings},
    storage::LocalFileStorage,
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use util::config::Environment;

pub const TEST_PUBLIC_URL: &str = "http://test.local";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub transactional: Arc<RecordingSender>,
    pub relay: Arc<RecordingSender>,
    pub avatar_root: TempDir,
}

pub async fn make_test_app() -> TestApp {
    build(RecordingSender::default(), RecordingSender::default()).await
}

pub async fn make_test_app_with_failing_mail() -> TestApp {
    build(RecordingSender::failing(), RecordingSender::failing()).await
}

async fn build(transactional: RecordingSender, relay: RecordingSender) -> TestApp {
    let db = setup_test_db().await;
    let avatar_root = tempfile::tempdir().expect("Failed to create avatar root");

    let transactional = Arc::new(transactional);
    let relay = Arc::new(relay);

    let state = AppState::new(
        AuthService::new(
            db,
            TokenSettings {
                secret: "api-test-secret".into(),
                duration_minutes: 60,
            },
        ),
        Environment::Test,
        TEST_PUBLIC_URL,
        Mailers {
            transactional: transactional.clone(),
            relay: relay.clone(),
        },
        Arc::new(LocalFileStorage::new(avatar_root.path(), AVATAR_URL_PREFIX)),
    );

    TestApp {
        app: build_app(state.clone(), avatar_root.path().to_path_buf()),
        state,
        transactional,
        relay,
        avatar_root,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response {
        self.app.clone().oneshot(req).await.unwrap()
    }

    /// Creates an account directly through the account service.
    pub async fn create_user(&self, email: &str, password: &str) -> UserModel {
        self.state
            .auth()
            .create(CreateUser {
                name: None,
                email: email.into(),
                password: password.into(),
                subscription: None,
            })
            .await
            .expect("Failed to create user")
    }

    /// Logs in over HTTP and returns the session token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/users/login",
                None,
                &json!({"email": email, "password": password}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = get_json_body(response).await;
        json["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn find_user(&self, id: i64) -> UserModel {
        user::Entity::find_by_id(id)
            .one(self.state.auth().db())
            .await
            .unwrap()
            .expect("user should exist")
    }

    pub async fn user_count(&self) -> usize {
        user::Entity::find()
            .all(self.state.auth().db())
            .await
            .unwrap()
            .len()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
