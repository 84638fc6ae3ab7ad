use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::auth::password::MAX_PASSWORD_BYTES;

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// A registered account as persisted by the user store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// bcrypt hash of the password. Never serialized into responses.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user record ready to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            username: self.username,
            password: self.password_hash,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Plaintext password. Limited to 72 characters and, since bcrypt reads bytes, to
    /// `MAX_PASSWORD_BYTES` bytes.
    #[validate(length(min = 6, max = 72), custom = "validate_password_bytes")]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut error = ValidationError::new("password_bytes");
        error.message = Some("Password must be at most 72 bytes".into());
        return Err(error);
    }
    Ok(())
}

/// Username and plaintext password presented at login. Never persisted.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AuthCredentials {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}
