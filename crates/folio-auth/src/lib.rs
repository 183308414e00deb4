//! # folio-auth
//!
//! Session and token lifecycle for the folio server.
//!
//! - [`keys`]: cache key registry
//! - [`token`]: HS256 access/refresh tokens and session issuance
//! - [`session`]: per-user session hash in the cache
//! - [`identity`]: cached identity of logged-in users
//! - [`middleware`]: axum extractors that authenticate requests
//! - [`password`]: Argon2id hashing

pub mod config;
pub mod error;
pub mod identity;
pub mod keys;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

pub use config::{AuthConfig, ConfigError};
pub use error::AuthError;
pub use identity::IdentityCache;
pub use middleware::{AuthContext, AuthState, BearerAuth, OptionalBearerAuth};
pub use session::SessionStore;
pub use token::TokenIssuer;
