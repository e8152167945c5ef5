//! Admin panel data
//!
//! Registrations, the team overview, and the global welcome message.

pub mod handlers;
pub mod sort;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::core::db::Database;
use crate::core::models::{Registration, TeamMember, TeamSummary, WelcomeMessage};

const WELCOME_MESSAGE_KEY: &str = "welcome_message";

pub struct AdminManager {
    db: Database,
}

impl AdminManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every registered profile, oldest first.
    pub async fn registrations(&self) -> Result<Vec<Registration>> {
        let rows: Vec<(String, String, String, Option<String>, Option<String>, String)> =
            sqlx::query_as(
                r#"
                SELECT p.id, COALESCE(p.name, ''), COALESCE(p.email, ''), t.name, p.experience, p.created_at
                FROM profiles p
                LEFT JOIN team_members tm ON tm.user_id = p.id
                LEFT JOIN teams t ON t.id = tm.team_id
                ORDER BY p.created_at, p.rowid
                "#,
            )
            .fetch_all(self.db.pool())
            .await
            .context("Failed to list registrations")?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, team, experience, created_at)| {
                let created_at = match created_at.parse::<DateTime<Utc>>() {
                    Ok(at) => Some(at),
                    Err(e) => {
                        warn!("[Admin] Unreadable created_at {:?} on profile {}: {}", created_at, id, e);
                        None
                    }
                };
                Registration {
                    id,
                    name,
                    email,
                    team,
                    experience,
                    created_at,
                }
            })
            .collect())
    }

    /// Teams in creation order, each with its members in join order.
    pub async fn teams(&self) -> Result<Vec<TeamSummary>> {
        let rows: Vec<(String, String, Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as(
                r#"
                SELECT t.id, t.name, tm.user_id, p.name, p.email
                FROM teams t
                LEFT JOIN team_members tm ON tm.team_id = t.id
                LEFT JOIN profiles p ON p.id = tm.user_id
                ORDER BY t.created_at, t.rowid, tm.joined_at, tm.rowid
                "#,
            )
            .fetch_all(self.db.pool())
            .await
            .context("Failed to list teams")?;

        let mut teams: Vec<(String, TeamSummary)> = Vec::new();
        for (team_id, team_name, member_id, name, email) in rows {
            if teams.last().map(|(id, _)| id != &team_id).unwrap_or(true) {
                teams.push((
                    team_id,
                    TeamSummary {
                        name: team_name,
                        members: Vec::new(),
                    },
                ));
            }
            if member_id.is_some() {
                if let Some((_, team)) = teams.last_mut() {
                    team.members.push(TeamMember {
                        name: name.unwrap_or_default(),
                        email: email.unwrap_or_default(),
                    });
                }
            }
        }

        Ok(teams.into_iter().map(|(_, team)| team).collect())
    }

    /// Empty when never set.
    pub async fn welcome_message(&self) -> Result<WelcomeMessage> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(WELCOME_MESSAGE_KEY)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(WelcomeMessage {
            message: row.map(|(value,)| value).unwrap_or_default(),
        })
    }

    pub async fn set_welcome_message(&self, message: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(WELCOME_MESSAGE_KEY)
        .bind(message)
        .execute(self.db.pool())
        .await
        .context("Failed to store welcome message")?;

        info!("[Admin] Welcome message updated ({} chars)", message.chars().count());
        Ok(())
    }
}
