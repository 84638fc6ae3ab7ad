use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use std::sync::Arc;

use todo_api::{
    auth::{SessionVerifier, TokenService},
    config::Config,
    db,
    routes::{self, health},
    services::{AuthService, TaskService},
    store::{PgTaskStore, PgUserStore},
};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let pool = db::create_pool(&config)
        .await
        .map_err(|e| startup_error("Failed to connect to database", e))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    let tokens = TokenService::from_config(&config);
    let auth_service = web::Data::new(AuthService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        tokens.clone(),
        config.bcrypt_cost,
    ));
    let task_service = web::Data::new(TaskService::new(Arc::new(PgTaskStore::new(pool))));
    let verifier = web::Data::new(SessionVerifier::new(tokens));

    log::info!("Starting todo-api server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(auth_service.clone())
            .app_data(task_service.clone())
            .app_data(verifier.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
