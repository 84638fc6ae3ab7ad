use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;
use validator::Validate;

use crate::auth::{hash_password, verify_password, TokenService};
use crate::error::AppError;
use crate::models::{AuthCredentials, NewUser, RegisterRequest, User};
use crate::store::UserStore;

/// Credential checks, registration and session token issuance.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
    /// Hash checked against when the username is unknown, so both login failures cost one
    /// bcrypt verification at the configured work factor.
    dummy_hash: OnceCell<String>,
}

const DUMMY_PASSWORD: &str = "dummy password for unknown usernames";

/// The one error for both an unknown username and a wrong password.
fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Verifies `credentials` and issues a session token for the matching user.
    pub async fn login(&self, credentials: AuthCredentials) -> Result<(User, String), AppError> {
        credentials.validate()?;

        let user = match self.users.find_by_username(&credentials.username).await? {
            Some(user) => user,
            None => {
                let dummy_hash = self.dummy_hash().await?.to_string();
                blocking(move || verify_password(&credentials.password, &dummy_hash)).await?;
                log::warn!("Rejected login for unknown username");
                return Err(invalid_credentials());
            }
        };

        let stored_hash = user.password.clone();
        let matches =
            blocking(move || verify_password(&credentials.password, &stored_hash)).await?;
        if !matches {
            log::warn!("Rejected login for user {}: wrong password", user.id);
            return Err(invalid_credentials());
        }

        let token = self.tokens.issue(user.id)?;
        log::info!("User {} logged in", user.id);
        Ok((user, token))
    }

    /// Creates an account and issues a session token for it.
    ///
    /// A taken username is reported as `Conflict`; any failure while persisting is reported
    /// as an opaque internal error.
    pub async fn register(&self, request: RegisterRequest) -> Result<(User, String), AppError> {
        request.validate()?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::Conflict("Username is already taken".into()));
        }

        let cost = self.bcrypt_cost;
        let password = request.password;
        let password_hash = blocking(move || hash_password(&password, cost)).await?;

        let now = Utc::now();
        let new_user = NewUser {
            username: request.username,
            password_hash,
            name: request.name,
            created_at: now,
            updated_at: now,
        };

        let id = self.users.insert(&new_user).await.map_err(|e| {
            AppError::InternalServerError(format!(
                "Failed to persist user {:?}: {}",
                new_user.username, e
            ))
        })?;

        let user = new_user.into_user(id);
        let token = self.tokens.issue(id)?;
        log::info!("Registered user {} ({})", user.id, user.username);
        Ok((user, token))
    }

    async fn dummy_hash(&self) -> Result<&str, AppError> {
        let cost = self.bcrypt_cost;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| blocking(move || hash_password(DUMMY_PASSWORD, cost)))
            .await?;
        Ok(hash.as_str())
    }

    /// Looks up the account behind a verified session.
    pub async fn profile(&self, user_id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

/// Runs bcrypt work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password task failed: {}", e)))?
}
