//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use atelier_core::UserId;

use crate::{JwtClaims, Principal, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Turns a bearer credential into a verified caller.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthError>;
}

/// HS256 verifier for tokens carrying [`JwtClaims`].
///
/// Expiry is checked against `issued_at`/`expires_at` by [`validate_claims`],
/// so the registered `exp` claim is neither required nor validated.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenVerifier for Hs256JwtValidator {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;
        validate_claims(&claims, now)?;

        let uid = UserId::new(claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let display_name = claims.name.unwrap_or_else(|| claims.email.clone());
        tracing::debug!(uid = %uid, "bearer token verified");
        Ok(Principal {
            uid,
            email: claims.email,
            display_name,
        })
    }
}
