#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use todo_api::auth::{AuthResponse, SessionVerifier, TokenService};
use todo_api::routes::{self, health};
use todo_api::services::{AuthService, TaskService};
use todo_api::store::{MemoryTaskStore, MemoryUserStore};

pub const TEST_SECRET: &str = "integration_test_secret";
/// Lowest cost bcrypt accepts; keeps the suites fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// The stores behind one application instance, kept so tests can inspect them.
#[derive(Clone)]
pub struct TestState {
    pub users: Arc<MemoryUserStore>,
    pub tasks: Arc<MemoryTaskStore>,
    pub tokens: TokenService,
}

impl TestState {
    pub fn new() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            tasks: Arc::new(MemoryTaskStore::new()),
            tokens: TokenService::new(TEST_SECRET, 72),
        }
    }
}

/// Builds the same application as the binary, over in-memory stores.
pub fn test_app(
    state: TestState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let auth_service = AuthService::new(state.users, state.tokens.clone(), TEST_BCRYPT_COST);
    let task_service = TaskService::new(state.tasks);

    App::new()
        .app_data(web::Data::new(auth_service))
        .app_data(web::Data::new(task_service))
        .app_data(web::Data::new(SessionVerifier::new(state.tokens)))
        .wrap(Logger::default())
        .service(health::health)
        .configure(routes::config)
}

/// A registered user and the token issued at registration.
#[derive(Debug)]
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(json!({
            "username": username,
            "password": password,
            "name": format!("{} tester", username)
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if status != StatusCode::CREATED {
        return Err(format!(
            "Failed to register {}. Status: {}. Body: {}",
            username,
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse registration response: {}", e))?;
    Ok(TestUser {
        id: auth.user.id,
        token: auth.token,
    })
}

/// Creates a task through the API and returns its JSON representation.
pub async fn create_task(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    user: &TestUser,
    payload: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/v1/todos")
        .insert_header(user.bearer())
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "payload: {}", payload);
    test::read_body_json(resp).await
}

pub fn task_payload(text: &str, category: &str, priority: &str) -> Value {
    json!({
        "text": text,
        "category": category,
        "date": "2024-06-01T09:00:00Z",
        "priority_level": priority
    })
}
