//! The core: credential handling and owner-scoped task operations.
//!
//! Services own no mutable state; everything lives behind the store traits, so one
//! instance is shared by every worker through `web::Data`.

pub mod auth;
pub mod tasks;

pub use auth::AuthService;
pub use tasks::TaskService;
