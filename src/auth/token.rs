use crate::config::Config;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Algorithms a presented token may be signed with. Everything outside the HMAC family is refused.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identity of the user the token was issued to.
    pub id: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: u64,
}

/// Signs and verifies session tokens with one process-wide symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_hours)
    }

    /// Issues an HS256 token for `user_id` that expires after the configured lifetime.
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let exp = (Utc::now() + self.ttl).timestamp();
        let claims = Claims {
            id: user_id,
            exp: u64::try_from(exp).map_err(|_| {
                AppError::InternalServerError(format!("Token expiry out of range: {}", exp))
            })?,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature, algorithm and expiry of `token` and returns its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, signed with another secret
    /// or a non-HMAC algorithm, or has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(AppError::from)
    }
}
