use actix_web::{get, post, web, HttpResponse, Responder};

use crate::{
    auth::{AuthResponse, AuthenticatedUserId},
    error::AppError,
    models::{AuthCredentials, RegisterRequest},
    services::AuthService,
};

/// Register a new user
///
/// Creates the account and returns a session token for it.
///
/// ## Responses:
/// - `201 Created`: `{"token": ..., "user": ...}`.
/// - `409 Conflict`: The username is already taken.
/// - `422 Unprocessable Entity`: The payload fails validation.
#[post("/register")]
pub async fn register(
    service: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let (user, token) = service.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(AuthResponse { token, user }))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{"token": ..., "user": ...}`.
/// - `401 Unauthorized`: Unknown username or wrong password; both answer identically.
#[post("/login")]
pub async fn login(
    service: web::Data<AuthService>,
    login_data: web::Json<AuthCredentials>,
) -> Result<impl Responder, AppError> {
    let (user, token) = service.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

/// The account behind the presented session token.
#[get("")]
pub async fn me(
    service: web::Data<AuthService>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = service.profile(user_id.0).await?;
    Ok(HttpResponse::Ok().json(user))
}
