//! Volunteers
//!
//! Volunteer profiles (with availability slots) and the tasks assigned to them.

pub mod handlers;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::core::db::Database;
use crate::core::models::{Task, VolunteerProfile};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    /// User ids to assign the task to
    #[serde(default)]
    pub assignees: Vec<String>,
}

pub struct VolunteerManager {
    db: Database,
}

impl VolunteerManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn volunteer(&self, user_id: &str) -> Result<Option<VolunteerProfile>> {
        let row: Option<(String, Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as("SELECT id, name, email, phone FROM profiles WHERE id = ?")
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?;

        let Some((id, name, email, phone)) = row else {
            return Ok(None);
        };

        Ok(Some(VolunteerProfile {
            availability: self.availability(&id).await?,
            id,
            name,
            email,
            phone,
        }))
    }

    pub async fn availability(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT slot FROM volunteer_availability WHERE user_id = ? ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(|(slot,)| slot).collect())
    }

    /// Replace the user's availability slots, keeping the given order.
    pub async fn set_availability(&self, user_id: &str, slots: &[String]) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        self.set_availability_with(&mut tx, user_id, slots).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Same as [`set_availability`](Self::set_availability), on a caller-owned
    /// connection or transaction.
    pub async fn set_availability_with(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        slots: &[String],
    ) -> Result<()> {
        sqlx::query("DELETE FROM volunteer_availability WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        let slots = slots.iter().map(|s| s.trim()).filter(|s| !s.is_empty());
        for (position, slot) in slots.enumerate() {
            sqlx::query(
                "INSERT INTO volunteer_availability (user_id, position, slot) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(position as i64)
            .bind(slot)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Tasks assigned to the user, in assignment order.
    pub async fn tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let rows: Vec<(String, String, Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as(
                r#"
                SELECT t.id, t.name, t.description, t.time, t.location
                FROM task_assignments ta
                JOIN tasks t ON t.id = ta.task_id
                WHERE ta.user_id = ?
                ORDER BY ta.assigned_at, ta.rowid
                "#,
            )
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, description, time, location)| Task {
                id,
                name,
                description,
                time,
                location,
            })
            .collect())
    }

    pub async fn create_task(&self, new: &NewTask) -> Result<Task> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Task name is required"));
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: new.description.clone(),
            time: new.time.clone(),
            location: new.location.clone(),
        };

        sqlx::query(
            "INSERT INTO tasks (id, name, description, time, location, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(&task.time)
        .bind(&task.location)
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await
        .context("Failed to create task")?;

        for user_id in &new.assignees {
            self.assign_task(&task.id, user_id).await?;
        }

        info!("[Volunteer] Task created: {}", task.name);
        Ok(task)
    }

    /// Assigning the same task twice is a no-op.
    pub async fn assign_task(&self, task_id: &str, user_id: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO task_assignments (task_id, user_id, assigned_at) VALUES (?, ?, ?)",
        )
        .bind(task_id)
        .bind(user_id)
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
