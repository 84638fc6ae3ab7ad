pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Malformed JSON bodies and query strings answer with the same `{"error": ...}` shape
/// as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Mounts the `/api/v1` surface. Expects `web::Data` for `AuthService`, `TaskService` and
/// `SessionVerifier` in the application data.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(json_config())
            .app_data(query_config())
            .service(auth::register)
            .service(auth::login)
            .service(web::scope("/me").wrap(AuthMiddleware).service(auth::me))
            .service(
                // `/categories` is registered ahead of `/{id}`.
                web::scope("/todos")
                    .wrap(AuthMiddleware)
                    .service(tasks::get_categories)
                    .service(tasks::get_tasks)
                    .service(tasks::create_task)
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::delete_task),
            ),
    );
}
