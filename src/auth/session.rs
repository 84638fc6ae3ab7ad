use crate::auth::token::TokenService;
use crate::error::AppError;

const BEARER_SCHEME: &str = "Bearer";

/// Validates the `Authorization` header of a protected request and yields the owner identity.
///
/// Trusts the signed claim instead of re-reading the user store, so a token stays valid
/// until it expires even if the account changes in the meantime.
#[derive(Clone)]
pub struct SessionVerifier {
    tokens: TokenService,
}

impl SessionVerifier {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    /// Runs the bearer checks in order: presence, scheme, then signature, algorithm and expiry.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<i64, AppError> {
        let header = authorization
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

        let token = match header.split_once(' ') {
            Some((scheme, token)) if scheme == BEARER_SCHEME && is_single_token(token) => token,
            _ => return Err(AppError::Unauthorized("Invalid token".into())),
        };

        self.tokens.verify(token).map(|claims| claims.id)
    }
}

fn is_single_token(token: &str) -> bool {
    !token.is_empty() && !token.contains(char::is_whitespace)
}
