use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt only reads this many bytes of input; anything past it would be ignored silently.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes `password` with a fresh random salt at the given bcrypt work factor.
///
/// Passwords longer than `MAX_PASSWORD_BYTES` are refused rather than truncated.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::BadRequest(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored bcrypt hash. The digest comparison is constant-time.
///
/// A password longer than `MAX_PASSWORD_BYTES` never matches, since no stored hash can
/// come from one.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    let verified = verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))?;
    Ok(verified && password.len() <= MAX_PASSWORD_BYTES)
}
