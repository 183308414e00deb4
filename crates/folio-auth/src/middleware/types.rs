use folio_storage::User;
use uuid::Uuid;

/// Identity resolved for an authenticated request.
///
/// Handlers receive this value explicitly through the extractors and trust it
/// without re-validating.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The cached identity of the caller.
    pub user: User,
    /// The login session the request was made under.
    pub session_id: Uuid,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}
