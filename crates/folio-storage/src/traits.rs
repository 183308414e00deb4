//! Storage traits implemented by every persistent backend.
//!
//! Each entity gets its own trait so handlers can depend on exactly the
//! operations they use. [`Storage`] bundles all of them for wiring the
//! application state.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageResult;
use crate::types::{
    AuditLogEntry, NewAuditLogEntry, NewProject, NewUser, Profile, ProfileChanges, Project,
    ProjectChanges, User, Visibility,
};

/// Persistence for [`User`] accounts.
///
/// Implementations must enforce uniqueness of `email` and `username` and report
/// violations as [`StorageError::Conflict`](crate::StorageError::Conflict) with
/// the offending column as `field`.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the email or username is already taken.
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
}

/// Persistence for the one-to-one [`Profile`] of a user.
#[async_trait]
pub trait ProfileStorage: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> StorageResult<Option<Profile>>;

    /// Creates the profile of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` (field `user_id`) if the user already has a profile.
    async fn create_profile(&self, user_id: Uuid, changes: ProfileChanges)
    -> StorageResult<Profile>;

    /// Applies `changes` to the profile of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no profile.
    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges)
    -> StorageResult<Profile>;
}

/// Persistence for [`Project`] records.
#[async_trait]
pub trait ProjectStorage: Send + Sync {
    async fn create_project(&self, project: NewProject) -> StorageResult<Project>;

    async fn find_project(&self, id: Uuid) -> StorageResult<Option<Project>>;

    /// Lists the projects of `owner_id`, oldest first.
    ///
    /// When `visibility` is set only projects with that visibility are returned.
    async fn list_projects(
        &self,
        owner_id: Uuid,
        visibility: Option<Visibility>,
    ) -> StorageResult<Vec<Project>>;

    /// # Errors
    ///
    /// Returns `NotFound` if the project does not exist.
    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> StorageResult<Project>;

    /// # Errors
    ///
    /// Returns `NotFound` if the project does not exist.
    async fn delete_project(&self, id: Uuid) -> StorageResult<()>;
}

/// Append-only audit log.
#[async_trait]
pub trait AuditLogStorage: Send + Sync {
    async fn append_audit_log(&self, entry: NewAuditLogEntry) -> StorageResult<AuditLogEntry>;

    /// Returns at most `limit` entries of `actor_id`, newest first.
    async fn recent_audit_logs(
        &self,
        actor_id: Uuid,
        limit: usize,
    ) -> StorageResult<Vec<AuditLogEntry>>;
}

/// A backend implementing every entity store.
#[async_trait]
pub trait Storage: UserStorage + ProfileStorage + ProjectStorage + AuditLogStorage {
    /// Short backend name used in logs and the readiness probe.
    fn backend_name(&self) -> &'static str;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> StorageResult<()>;
}

/// Shared handle to a storage backend.
pub type DynStorage = Arc<dyn Storage>;
