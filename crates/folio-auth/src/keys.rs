//! Cache key registry.
//!
//! Every cache key the server touches is built here. Keys are scoped by user
//! and carry a schema version suffix so a format change can be rolled out by
//! bumping the suffix instead of flushing the cache.

use std::fmt::Display;

const VERSION: &str = "v1";

/// Serialized identity of a logged-in user.
pub fn user_auth(user_id: impl Display) -> String {
    format!("user:{user_id}:auth:{VERSION}")
}

/// Hash of `session id -> refresh token` for one user.
pub fn user_sessions(user_id: impl Display) -> String {
    format!("user:{user_id}:sessions:{VERSION}")
}

pub fn user_profile(user_id: impl Display) -> String {
    format!("user:{user_id}:profile:{VERSION}")
}

pub fn user_projects(user_id: impl Display) -> String {
    format!("user:{user_id}:projects:{VERSION}")
}

/// Most recent audit entries of one actor.
pub fn user_audit_logs(user_id: impl Display) -> String {
    format!("user:{user_id}:audit-logs:{VERSION}")
}
