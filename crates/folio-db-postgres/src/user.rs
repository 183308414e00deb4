//! User storage.

use async_trait::async_trait;
use folio_storage::{NewUser, StorageResult, User, UserStorage};
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::PostgresError;
use crate::storage::PostgresStorage;

type UserTuple = (Uuid, String, String, String, String, String, OffsetDateTime, OffsetDateTime);

const USER_COLUMNS: &str =
    "id, email, username, password_hash, first_name, last_name, created_at, updated_at";

fn from_tuple(row: UserTuple) -> User {
    User {
        id: row.0,
        email: row.1,
        username: row.2,
        password_hash: row.3,
        first_name: row.4,
        last_name: row.5,
        created_at: row.6,
        updated_at: row.7,
    }
}

impl PostgresStorage {
    async fn find_user_where(&self, column: &str, value: &str) -> StorageResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row: Option<UserTuple> = query_as(&sql)
            .bind(value)
            .fetch_optional(self.pool())
            .await
            .map_err(PostgresError::from)?;
        Ok(row.map(from_tuple))
    }
}

#[async_trait]
impl UserStorage for PostgresStorage {
    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let row: UserTuple = query_as(
            r#"
            INSERT INTO users (id, email, username, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, username, password_hash, first_name, last_name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(self.pool())
        .await
        .map_err(PostgresError::from)?;

        Ok(from_tuple(row))
    }

    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserTuple> = query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(PostgresError::from)?;
        Ok(row.map(from_tuple))
    }

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        self.find_user_where("email", email).await
    }

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        self.find_user_where("username", username).await
    }
}
