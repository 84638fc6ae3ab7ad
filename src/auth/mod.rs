pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::models::User;

pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use session::SessionVerifier;
pub use token::{Claims, TokenService};

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed session token to present as `Authorization: Bearer <token>`.
    pub token: String,
    /// The authenticated user, without the password hash.
    pub user: User,
}
