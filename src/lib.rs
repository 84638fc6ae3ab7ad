#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Multi-tenant to-do backend: account registration and login, signed session tokens,"]
#![doc = "and owner-scoped task management. The binary (`main.rs`) wires the PostgreSQL stores,"]
#![doc = "the services and the routes into an actix-web server; the test suites wire the"]
#![doc = "in-memory stores instead."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
