use crate::domain;
use crate::domain::DeletedRows;
use crate::domain::task::{NewTask, Priority, Status, Task, TaskOrigin, TaskSeed, UpdateTask};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error, anyhow};
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};
use std::str::FromStr;

pub struct DbTaskReader;
pub struct DbTaskWriter;

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i32,
    title: String,
    description: Option<String>,
    due_at: Option<DateTime<Utc>>,
    priority: String,
    status: String,
    created_by: i32,
    owner_profile_id: Option<i32>,
    list_id: Option<i32>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = anyhow::Error;

    /// Rejects rows violating the single-origin constraint rather than letting
    /// corrupt data masquerade as a valid task
    fn try_from(value: TaskRow) -> Result<Task, anyhow::Error> {
        let origin = match (value.owner_profile_id, value.list_id) {
            (Some(owner), None) => TaskOrigin::Personal { owner },
            (None, Some(list)) => TaskOrigin::Collaborative { list },
            _ => {
                return Err(anyhow!(
                    "task {} has an invalid origin (owner: {:?}, list: {:?})",
                    value.id,
                    value.owner_profile_id,
                    value.list_id
                ));
            }
        };

        Ok(Task {
            id: value.id,
            title: value.title,
            description: value.description,
            due_at: value.due_at,
            priority: Priority::from_str(&value.priority).map_err(Error::new)?,
            status: Status::from_str(&value.status).map_err(Error::new)?,
            created_by: value.created_by,
            origin,
            deleted_at: value.deleted_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

fn deleted_filter(deleted: DeletedRows) -> &'static str {
    match deleted {
        DeletedRows::Exclude => " AND t.deleted_at IS NULL",
        DeletedRows::Include => "",
    }
}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn personal_tasks(
        &self,
        owner_profile_id: i32,
        deleted: DeletedRows,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let sql = format!(
            "SELECT t.* FROM tasks t WHERE t.owner_profile_id = $1{} ORDER BY t.id",
            deleted_filter(deleted)
        );
        query_as::<_, TaskRow>(&sql)
            .bind(owner_profile_id)
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch a profile's personal tasks")?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    async fn tasks_in_lists(
        &self,
        list_ids: &[i32],
        deleted: DeletedRows,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let sql = format!(
            "SELECT t.* FROM tasks t WHERE t.list_id = ANY($1){} ORDER BY t.id",
            deleted_filter(deleted)
        );
        query_as::<_, TaskRow>(&sql)
            .bind(list_ids)
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch tasks in a set of lists")?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    async fn task_by_id(
        &self,
        task_id: i32,
        deleted: DeletedRows,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let sql = format!(
            "SELECT t.* FROM tasks t WHERE t.id = $1{}",
            deleted_filter(deleted)
        );
        query_as::<_, TaskRow>(&sql)
            .bind(task_id)
            .fetch_optional(cxn.borrow_connection())
            .await
            .context("trying to fetch a task by ID")?
            .map(Task::try_from)
            .transpose()
    }
}

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn create(
        &self,
        content: &NewTask,
        seed: TaskSeed,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let (owner_profile_id, list_id) = match seed.origin {
            TaskOrigin::Personal { owner } => (Some(owner), None),
            TaskOrigin::Collaborative { list } => (None, Some(list)),
        };

        let new_id = query_as::<_, super::NewId>(
            "INSERT INTO tasks(title, description, due_at, priority, status, created_by, owner_profile_id, list_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING tasks.id",
        )
        .bind(&content.title)
        .bind(&content.description)
        .bind(content.due_at)
        .bind(content.priority.as_str())
        .bind(content.status.as_str())
        .bind(seed.created_by)
        .bind(owner_profile_id)
        .bind(list_id)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new task into the database")?;

        Ok(new_id.id)
    }

    async fn update(
        &self,
        task_id: i32,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // Nullable columns can't be patched through COALESCE: an untouched field
        // and an explicit clear would both bind SQL NULL. The presence flags
        // carry the outer option so a bound NULL really clears the column.
        query(
            "UPDATE tasks SET \
               title = COALESCE($1, title), \
               description = CASE WHEN $2 THEN $3 ELSE description END, \
               due_at = CASE WHEN $4 THEN $5 ELSE due_at END, \
               priority = COALESCE($6, priority), \
               status = COALESCE($7, status), \
               updated_at = now() \
             WHERE id = $8",
        )
        .bind(&update.title)
        .bind(update.description.is_some())
        .bind(update.description.as_ref().and_then(|field| field.as_deref()))
        .bind(update.due_at.is_some())
        .bind(update.due_at.flatten())
        .bind(update.priority.map(|priority| priority.as_str()))
        .bind(update.status.map(|status| status.as_str()))
        .bind(task_id)
        .execute(cxn.borrow_connection())
        .await
        .context("trying to update a task in the database")?;

        Ok(())
    }

    async fn mark_deleted(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // The IS NULL guard keeps the original deletion timestamp on repeat calls
        query("UPDATE tasks SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to soft-delete a task in the database")?;

        Ok(())
    }

    async fn clear_deleted(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("UPDATE tasks SET deleted_at = NULL WHERE id = $1")
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to restore a soft-deleted task in the database")?;

        Ok(())
    }
}
