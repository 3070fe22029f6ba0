//! `atelier-auth`: authentication/authorization boundary.
//!
//! Token verification and pure permission checks. This crate is decoupled
//! from HTTP and storage; the caller decides which roles a principal holds.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod verifier;

pub use authorize::{AuthzError, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
pub use verifier::{AuthError, Hs256JwtValidator, TokenVerifier};
