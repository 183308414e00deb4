//! Domain records persisted by the relational store.
//!
//! All records serialize with camelCase field names and RFC 3339 timestamps,
//! which is the shape returned to API clients and stored in the cache.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A registered account.
///
/// `password_hash` is never serialized, so a `User` can be written to the
/// identity cache or returned to a client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Input for creating a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// One-to-one extension of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub website: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Partial profile update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub website: Option<String>,
}

/// Who can read a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLIC" => Ok(Self::Public),
            "PRIVATE" => Ok(Self::Private),
            other => Err(format!("unknown visibility '{other}'")),
        }
    }
}

/// A portfolio project owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub github_link: String,
    pub preview_link: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub visibility: Visibility,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Project {
    /// Returns `true` when `viewer` may read this project.
    ///
    /// Public projects are readable by anyone, private ones only by the owner.
    #[must_use]
    pub fn is_visible_to(&self, viewer: Option<Uuid>) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Private => viewer == Some(self.owner_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub github_link: String,
    pub preview_link: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

/// Partial project update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub github_link: Option<String>,
    pub preview_link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
}

impl ProjectChanges {
    /// Applies the present fields onto `project`.
    pub fn apply_to(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(github_link) = self.github_link {
            project.github_link = github_link;
        }
        if let Some(preview_link) = self.preview_link {
            project.preview_link = preview_link;
        }
        if let Some(tags) = self.tags {
            project.tags = tags;
        }
        if let Some(visibility) = self.visibility {
            project.visibility = visibility;
        }
    }
}

/// Kind of state-changing action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    UserLogin,
    UserLogout,
    ProfileCreate,
    ProfileUpdate,
    ProjectCreate,
    ProjectUpdate,
    ProjectDelete,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserLogin => "USER_LOGIN",
            Self::UserLogout => "USER_LOGOUT",
            Self::ProfileCreate => "PROFILE_CREATE",
            Self::ProfileUpdate => "PROFILE_UPDATE",
            Self::ProjectCreate => "PROJECT_CREATE",
            Self::ProjectUpdate => "PROJECT_UPDATE",
            Self::ProjectDelete => "PROJECT_DELETE",
        }
    }

    /// The entity type this action applies to.
    #[must_use]
    pub fn entity_type(&self) -> AuditEntityType {
        match self {
            Self::UserLogin | Self::UserLogout => AuditEntityType::User,
            Self::ProfileCreate | Self::ProfileUpdate => AuditEntityType::Profile,
            Self::ProjectCreate | Self::ProjectUpdate | Self::ProjectDelete => {
                AuditEntityType::Project
            }
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "USER_LOGIN" => Self::UserLogin,
            "USER_LOGOUT" => Self::UserLogout,
            "PROFILE_CREATE" => Self::ProfileCreate,
            "PROFILE_UPDATE" => Self::ProfileUpdate,
            "PROJECT_CREATE" => Self::ProjectCreate,
            "PROJECT_UPDATE" => Self::ProjectUpdate,
            "PROJECT_DELETE" => Self::ProjectDelete,
            other => return Err(format!("unknown audit action '{other}'")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditEntityType {
    User,
    Profile,
    Project,
}

impl AuditEntityType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Profile => "PROFILE",
            Self::Project => "PROJECT",
        }
    }
}

impl std::str::FromStr for AuditEntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "PROFILE" => Ok(Self::Profile),
            "PROJECT" => Ok(Self::Project),
            other => Err(format!("unknown audit entity type '{other}'")),
        }
    }
}

/// An immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    #[serde(rename = "entity")]
    pub entity_type: AuditEntityType,
    pub entity_id: String,
    pub metadata: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAuditLogEntry {
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: String,
    pub metadata: Option<serde_json::Value>,
}
