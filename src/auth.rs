use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by access tokens from the hosted auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Caller identity after token verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Verifies HS256 access tokens signed with the project's JWT secret
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.leeway = 30;

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw token and return the caller
    ///
    /// # Returns
    /// * `Ok(AuthenticatedUser)` if the signature, expiry and audience check out
    /// * `Err(AppError::Unauthorized)` otherwise
    pub fn verify(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidAudience => "Token audience mismatch",
                ErrorKind::InvalidSignature => "Invalid token signature",
                _ => "Invalid token",
            };
            AppError::Unauthorized(reason.to_string())
        })?;

        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Token subject is not a user id".to_string()))?;

        Ok(AuthenticatedUser {
            id,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(header: Option<&str>) -> AppResult<&str> {
    let header = header
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(|| {
            AppError::Unauthorized("Authorization header must use the Bearer scheme".to_string())
        })?;

    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token".to_string()));
    }

    Ok(token)
}
