//! # folio-storage
//!
//! Domain model and storage abstraction layer for the folio server.
//!
//! This crate defines the records, the persistent storage traits and the
//! cache contract. Implementations live in `folio-db-memory` and
//! `folio-db-postgres`; the Redis cache lives in the server crate.

mod cache;
mod error;
mod traits;
mod types;

pub use cache::{CacheStore, DynCache};
pub use error::{CacheError, CacheResult, StorageError, StorageResult};
pub use traits::{AuditLogStorage, DynStorage, ProfileStorage, ProjectStorage, Storage, UserStorage};
pub use types::{
    AuditAction, AuditEntityType, AuditLogEntry, NewAuditLogEntry, NewProject, NewUser, Profile,
    ProfileChanges, Project, ProjectChanges, User, Visibility,
};
