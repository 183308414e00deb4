//! Project storage.

use async_trait::async_trait;
use folio_storage::{
    NewProject, Project, ProjectChanges, ProjectStorage, StorageError, StorageResult, Visibility,
};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::PostgresError;
use crate::storage::{PostgresStorage, parse_column};

type ProjectTuple = (
    Uuid,
    Uuid,
    String,
    String,
    String,
    String,
    Vec<String>,
    String,
    OffsetDateTime,
    OffsetDateTime,
);

const PROJECT_COLUMNS: &str = "id, owner_id, title, description, github_link, preview_link, \
                               tags, visibility, created_at, updated_at";

fn from_tuple(row: ProjectTuple) -> Result<Project, PostgresError> {
    Ok(Project {
        id: row.0,
        owner_id: row.1,
        title: row.2,
        description: row.3,
        github_link: row.4,
        preview_link: row.5,
        tags: row.6,
        visibility: parse_column(&row.7)?,
        created_at: row.8,
        updated_at: row.9,
    })
}

#[async_trait]
impl ProjectStorage for PostgresStorage {
    async fn create_project(&self, project: NewProject) -> StorageResult<Project> {
        let sql = format!(
            "INSERT INTO projects (id, owner_id, title, description, github_link, preview_link, tags, visibility) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PROJECT_COLUMNS}"
        );
        let row: ProjectTuple = query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(project.owner_id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.github_link)
            .bind(&project.preview_link)
            .bind(&project.tags)
            .bind(project.visibility.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(PostgresError::from)?;

        Ok(from_tuple(row)?)
    }

    async fn find_project(&self, id: Uuid) -> StorageResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let row: Option<ProjectTuple> = query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(PostgresError::from)?;

        Ok(row.map(from_tuple).transpose()?)
    }

    async fn list_projects(
        &self,
        owner_id: Uuid,
        visibility: Option<Visibility>,
    ) -> StorageResult<Vec<Project>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             WHERE owner_id = $1 AND ($2::text IS NULL OR visibility = $2) \
             ORDER BY seq"
        );
        let rows: Vec<ProjectTuple> = query_as(&sql)
            .bind(owner_id)
            .bind(visibility.map(|v| v.as_str()))
            .fetch_all(self.pool())
            .await
            .map_err(PostgresError::from)?;

        let projects = rows
            .into_iter()
            .map(from_tuple)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> StorageResult<Project> {
        let sql = format!(
            "UPDATE projects \
             SET title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 github_link = COALESCE($4, github_link), \
                 preview_link = COALESCE($5, preview_link), \
                 tags = COALESCE($6, tags), \
                 visibility = COALESCE($7, visibility), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let row: Option<ProjectTuple> = query_as(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.github_link)
            .bind(changes.preview_link)
            .bind(changes.tags)
            .bind(changes.visibility.map(|v| v.as_str()))
            .fetch_optional(self.pool())
            .await
            .map_err(PostgresError::from)?;

        match row {
            Some(row) => Ok(from_tuple(row)?),
            None => Err(StorageError::not_found("project", id)),
        }
    }

    async fn delete_project(&self, id: Uuid) -> StorageResult<()> {
        let result = query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(PostgresError::from)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("project", id));
        }
        Ok(())
    }
}
