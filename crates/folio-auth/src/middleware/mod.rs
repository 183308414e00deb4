//! Request authentication for axum handlers.

mod auth;
mod error;
mod types;

pub use auth::{AuthState, BearerAuth, OptionalBearerAuth, SESSION_ID_HEADER, authenticate};
pub use types::AuthContext;
