//! Profile storage.

use async_trait::async_trait;
use folio_storage::{Profile, ProfileChanges, ProfileStorage, StorageError, StorageResult};
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::PostgresError;
use crate::storage::PostgresStorage;

type ProfileTuple = (
    Uuid,
    Uuid,
    Option<String>,
    Option<String>,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_tuple(row: ProfileTuple) -> Profile {
    Profile {
        id: row.0,
        user_id: row.1,
        bio: row.2,
        website: row.3,
        created_at: row.4,
        updated_at: row.5,
    }
}

#[async_trait]
impl ProfileStorage for PostgresStorage {
    async fn find_profile(&self, user_id: Uuid) -> StorageResult<Option<Profile>> {
        let row: Option<ProfileTuple> = query_as(
            r#"
            SELECT id, user_id, bio, website, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(PostgresError::from)?;

        Ok(row.map(from_tuple))
    }

    async fn create_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> StorageResult<Profile> {
        let row: ProfileTuple = query_as(
            r#"
            INSERT INTO profiles (id, user_id, bio, website)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, bio, website, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(changes.bio)
        .bind(changes.website)
        .fetch_one(self.pool())
        .await
        .map_err(PostgresError::from)?;

        Ok(from_tuple(row))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> StorageResult<Profile> {
        let row: Option<ProfileTuple> = query_as(
            r#"
            UPDATE profiles
            SET bio = COALESCE($2, bio),
                website = COALESCE($3, website),
                updated_at = now()
            WHERE user_id = $1
            RETURNING id, user_id, bio, website, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(changes.bio)
        .bind(changes.website)
        .fetch_optional(self.pool())
        .await
        .map_err(PostgresError::from)?;

        row.map(from_tuple)
            .ok_or_else(|| StorageError::not_found("profile", user_id))
    }
}
