//! Token signing and session issuance.

mod issuer;
pub mod jwt;

pub use issuer::TokenIssuer;
pub use jwt::{JwtError, JwtService, SessionClaims};
