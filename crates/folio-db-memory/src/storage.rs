use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use folio_storage::{
    AuditLogEntry, AuditLogStorage, NewAuditLogEntry, NewProject, NewUser, Profile,
    ProfileChanges, ProfileStorage, Project, ProjectChanges, ProjectStorage, Storage,
    StorageError, StorageResult, User, UserStorage, Visibility,
};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Users plus the unique indexes that must change atomically with them.
#[derive(Debug, Default)]
struct UserTable {
    rows: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
    by_username: HashMap<String, Uuid>,
}

/// In-memory storage backend.
///
/// Users live behind one lock so the email/username indexes stay consistent
/// with the rows. Profiles and projects use `DashMap` for per-key locking; the
/// audit log is an append-only vector.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    users: RwLock<UserTable>,
    profiles: DashMap<Uuid, Profile>,
    /// Project id -> (insertion sequence, project)
    projects: DashMap<Uuid, (u64, Project)>,
    project_seq: AtomicU64,
    audit_logs: RwLock<Vec<AuditLogEntry>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.rows.len()
    }

    /// Number of stored audit entries.
    pub async fn audit_log_count(&self) -> usize {
        self.audit_logs.read().await.len()
    }
}

#[async_trait]
impl UserStorage for InMemoryStorage {
    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut table = self.users.write().await;
        if table.by_email.contains_key(&user.email) {
            return Err(StorageError::conflict("email", "email already exists"));
        }
        if table.by_username.contains_key(&user.username) {
            return Err(StorageError::conflict("username", "username already exists"));
        }

        let now = OffsetDateTime::now_utc();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: now,
            updated_at: now,
        };
        table.by_email.insert(record.email.clone(), record.id);
        table.by_username.insert(record.username.clone(), record.id);
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<User>> {
        Ok(self.users.read().await.rows.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let table = self.users.read().await;
        Ok(table
            .by_email
            .get(email)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let table = self.users.read().await;
        Ok(table
            .by_username
            .get(username)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }
}

#[async_trait]
impl ProfileStorage for InMemoryStorage {
    async fn find_profile(&self, user_id: Uuid) -> StorageResult<Option<Profile>> {
        Ok(self.profiles.get(&user_id).map(|p| p.value().clone()))
    }

    async fn create_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> StorageResult<Profile> {
        match self.profiles.entry(user_id) {
            Entry::Occupied(_) => Err(StorageError::conflict("user_id", "profile already exists")),
            Entry::Vacant(slot) => {
                let now = OffsetDateTime::now_utc();
                let profile = Profile {
                    id: Uuid::new_v4(),
                    user_id,
                    bio: changes.bio,
                    website: changes.website,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(profile.clone());
                Ok(profile)
            }
        }
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> StorageResult<Profile> {
        let mut profile = self
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| StorageError::not_found("profile", user_id))?;
        if let Some(bio) = changes.bio {
            profile.bio = Some(bio);
        }
        if let Some(website) = changes.website {
            profile.website = Some(website);
        }
        profile.updated_at = OffsetDateTime::now_utc();
        Ok(profile.clone())
    }
}

#[async_trait]
impl ProjectStorage for InMemoryStorage {
    async fn create_project(&self, project: NewProject) -> StorageResult<Project> {
        let now = OffsetDateTime::now_utc();
        let record = Project {
            id: Uuid::new_v4(),
            owner_id: project.owner_id,
            title: project.title,
            description: project.description,
            github_link: project.github_link,
            preview_link: project.preview_link,
            tags: project.tags,
            visibility: project.visibility,
            created_at: now,
            updated_at: now,
        };
        let seq = self.project_seq.fetch_add(1, Ordering::SeqCst);
        self.projects.insert(record.id, (seq, record.clone()));
        Ok(record)
    }

    async fn find_project(&self, id: Uuid) -> StorageResult<Option<Project>> {
        Ok(self.projects.get(&id).map(|entry| entry.value().1.clone()))
    }

    async fn list_projects(
        &self,
        owner_id: Uuid,
        visibility: Option<Visibility>,
    ) -> StorageResult<Vec<Project>> {
        let mut rows: Vec<(u64, Project)> = self
            .projects
            .iter()
            .filter(|entry| {
                let project = &entry.value().1;
                project.owner_id == owner_id
                    && visibility.is_none_or(|v| project.visibility == v)
            })
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, project)| project).collect())
    }

    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> StorageResult<Project> {
        let mut entry = self
            .projects
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("project", id))?;
        let project = &mut entry.value_mut().1;
        changes.apply_to(project);
        project.updated_at = OffsetDateTime::now_utc();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: Uuid) -> StorageResult<()> {
        self.projects
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("project", id))
    }
}

#[async_trait]
impl AuditLogStorage for InMemoryStorage {
    async fn append_audit_log(&self, entry: NewAuditLogEntry) -> StorageResult<AuditLogEntry> {
        let record = AuditLogEntry {
            id: Uuid::new_v4(),
            actor_id: entry.actor_id,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            metadata: entry.metadata,
            created_at: OffsetDateTime::now_utc(),
        };
        self.audit_logs.write().await.push(record.clone());
        Ok(record)
    }

    async fn recent_audit_logs(
        &self,
        actor_id: Uuid,
        limit: usize,
    ) -> StorageResult<Vec<AuditLogEntry>> {
        let logs = self.audit_logs.read().await;
        Ok(logs
            .iter()
            .rev()
            .filter(|entry| entry.actor_id == actor_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_storage::{AuditAction, AuditEntityType};

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.into(),
            username: username.into(),
            password_hash: "hash".into(),
            first_name: "A".into(),
            last_name: "B".into(),
        }
    }

    fn new_project(owner_id: Uuid, title: &str, visibility: Visibility) -> NewProject {
        NewProject {
            owner_id,
            title: title.into(),
            description: "d".into(),
            github_link: "https://github.com/x".into(),
            preview_link: "https://x.dev".into(),
            tags: vec!["rust".into()],
            visibility,
        }
    }

    #[tokio::test]
    async fn duplicate_email_and_username_conflict() {
        let storage = InMemoryStorage::new();
        storage.create_user(new_user("a@b.com", "a")).await.unwrap();

        let err = storage
            .create_user(new_user("a@b.com", "other"))
            .await
            .unwrap_err();
        assert_eq!(err.conflict_field(), Some("email"));

        let err = storage
            .create_user(new_user("c@d.com", "a"))
            .await
            .unwrap_err();
        assert_eq!(err.conflict_field(), Some("username"));
        assert_eq!(storage.user_count().await, 1);
    }

    #[tokio::test]
    async fn find_user_by_indexes() {
        let storage = InMemoryStorage::new();
        let user = storage.create_user(new_user("a@b.com", "a")).await.unwrap();
        assert_eq!(
            storage.find_user_by_email("a@b.com").await.unwrap().unwrap().id,
            user.id
        );
        assert_eq!(
            storage.find_user_by_username("a").await.unwrap().unwrap().id,
            user.id
        );
        assert!(storage.find_user_by_email("x@y.z").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_is_one_to_one() {
        let storage = InMemoryStorage::new();
        let user_id = Uuid::new_v4();
        let changes = ProfileChanges {
            bio: Some("hello".into()),
            website: None,
        };
        storage.create_profile(user_id, changes.clone()).await.unwrap();
        let err = storage.create_profile(user_id, changes).await.unwrap_err();
        assert!(err.is_conflict());

        let updated = storage
            .update_profile(
                user_id,
                ProfileChanges {
                    bio: None,
                    website: Some("https://a.dev".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("hello"));
        assert_eq!(updated.website.as_deref(), Some("https://a.dev"));

        let missing = storage
            .update_profile(Uuid::new_v4(), ProfileChanges::default())
            .await
            .unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn list_projects_filters_by_owner_and_visibility() {
        let storage = InMemoryStorage::new();
        let owner = Uuid::new_v4();
        storage
            .create_project(new_project(owner, "one", Visibility::Public))
            .await
            .unwrap();
        storage
            .create_project(new_project(owner, "two", Visibility::Private))
            .await
            .unwrap();
        storage
            .create_project(new_project(Uuid::new_v4(), "other", Visibility::Public))
            .await
            .unwrap();

        let all = storage.list_projects(owner, None).await.unwrap();
        assert_eq!(
            all.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
            vec!["one", "two"]
        );
        let private = storage
            .list_projects(owner, Some(Visibility::Private))
            .await
            .unwrap();
        assert_eq!(private.len(), 1);
        assert_eq!(private[0].title, "two");
    }

    #[tokio::test]
    async fn update_and_delete_project() {
        let storage = InMemoryStorage::new();
        let project = storage
            .create_project(new_project(Uuid::new_v4(), "one", Visibility::Public))
            .await
            .unwrap();
        let updated = storage
            .update_project(
                project.id,
                ProjectChanges {
                    title: Some("renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, "d");

        storage.delete_project(project.id).await.unwrap();
        assert!(storage.find_project(project.id).await.unwrap().is_none());
        assert!(storage.delete_project(project.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn recent_audit_logs_newest_first_and_limited() {
        let storage = InMemoryStorage::new();
        let actor = Uuid::new_v4();
        for i in 0..5 {
            storage
                .append_audit_log(NewAuditLogEntry {
                    actor_id: actor,
                    action: AuditAction::ProjectCreate,
                    entity_type: AuditEntityType::Project,
                    entity_id: i.to_string(),
                    metadata: None,
                })
                .await
                .unwrap();
        }
        let logs = storage.recent_audit_logs(actor, 3).await.unwrap();
        assert_eq!(
            logs.iter().map(|l| l.entity_id.as_str()).collect::<Vec<_>>(),
            vec!["4", "3", "2"]
        );
        assert!(storage
            .recent_audit_logs(Uuid::new_v4(), 50)
            .await
            .unwrap()
            .is_empty());
    }
}
