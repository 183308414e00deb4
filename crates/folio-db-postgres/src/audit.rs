//! Audit log storage. Rows are never updated or deleted.

use async_trait::async_trait;
use folio_storage::{AuditLogEntry, AuditLogStorage, NewAuditLogEntry, StorageResult};
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::PostgresError;
use crate::storage::{PostgresStorage, parse_column};

type AuditTuple = (
    Uuid,
    Uuid,
    String,
    String,
    String,
    Option<serde_json::Value>,
    OffsetDateTime,
);

fn from_tuple(row: AuditTuple) -> Result<AuditLogEntry, PostgresError> {
    Ok(AuditLogEntry {
        id: row.0,
        actor_id: row.1,
        action: parse_column(&row.2)?,
        entity_type: parse_column(&row.3)?,
        entity_id: row.4,
        metadata: row.5,
        created_at: row.6,
    })
}

#[async_trait]
impl AuditLogStorage for PostgresStorage {
    async fn append_audit_log(&self, entry: NewAuditLogEntry) -> StorageResult<AuditLogEntry> {
        let row: AuditTuple = query_as(
            r#"
            INSERT INTO audit_logs (id, actor_id, action, entity, entity_id, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, actor_id, action, entity, entity_id, metadata, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.actor_id)
        .bind(entry.action.as_str())
        .bind(entry.entity_type.as_str())
        .bind(&entry.entity_id)
        .bind(&entry.metadata)
        .fetch_one(self.pool())
        .await
        .map_err(PostgresError::from)?;

        Ok(from_tuple(row)?)
    }

    async fn recent_audit_logs(
        &self,
        actor_id: Uuid,
        limit: usize,
    ) -> StorageResult<Vec<AuditLogEntry>> {
        let rows: Vec<AuditTuple> = query_as(
            r#"
            SELECT id, actor_id, action, entity, entity_id, metadata, created_at
            FROM audit_logs
            WHERE actor_id = $1
            ORDER BY seq DESC
            LIMIT $2
            "#,
        )
        .bind(actor_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.pool())
        .await
        .map_err(PostgresError::from)?;

        let entries = rows
            .into_iter()
            .map(from_tuple)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
