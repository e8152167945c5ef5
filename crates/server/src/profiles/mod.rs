//! Profiles & Teams
//!
//! Reads a user's profile and team roster for the participant dashboard, and
//! handles the writes behind public registration and admin team management.

pub mod handlers;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::db::Database;
use crate::core::models::{Profile, Role, Team, TeamMember};

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: String,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    experience: Option<String>,
    skills: Option<String>,
    tshirt: Option<String>,
    dietary: Option<String>,
    #[sqlx(rename = "type")]
    role: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            experience: row.experience,
            skills: row.skills,
            tshirt: row.tshirt,
            dietary: row.dietary,
            role: row.role.as_deref().and_then(Role::parse),
        }
    }
}

/// The team a user belongs to, without its roster.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Membership {
    pub team_id: String,
    pub name: String,
    pub created_by: Option<String>,
    pub max_members: i64,
}

/// Everything the participant dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantOverview {
    pub profile: Option<Profile>,
    pub team: Option<Team>,
}

/// Profile fields captured by the registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub tshirt: Option<String>,
    pub dietary: Option<String>,
    pub role: Option<Role>,
}

/// Blank form inputs arrive as empty strings; store them as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub struct ProfileManager {
    db: Database,
}

impl ProfileManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT id, name, email, phone, experience, skills, tshirt, dietary, type FROM profiles WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(Profile::from))
    }

    pub async fn membership(&self, user_id: &str) -> Result<Option<Membership>> {
        let row: Option<Membership> = sqlx::query_as(
            r#"
            SELECT t.id AS team_id, t.name, t.created_by, t.max_members
            FROM team_members tm
            JOIN teams t ON t.id = tm.team_id
            WHERE tm.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row)
    }

    /// Team members in join order.
    pub async fn roster(&self, team_id: &str) -> Result<Vec<TeamMember>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT COALESCE(p.name, ''), COALESCE(p.email, '')
            FROM team_members tm
            LEFT JOIN profiles p ON p.id = tm.user_id
            WHERE tm.team_id = ?
            ORDER BY tm.joined_at, tm.rowid
            "#,
        )
        .bind(team_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, email)| TeamMember { name, email })
            .collect())
    }

    /// Profile, then membership, then roster. Each missing piece leaves its
    /// section empty; a failed read is logged and treated the same way.
    pub async fn participant_overview(&self, user_id: &str) -> ParticipantOverview {
        let profile = match self.profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("[Profiles] Failed to fetch profile {}: {:#}", user_id, e);
                None
            }
        };

        let membership = match self.membership(user_id).await {
            Ok(membership) => membership,
            Err(e) => {
                warn!("[Profiles] Failed to fetch membership {}: {:#}", user_id, e);
                None
            }
        };

        let team = match membership {
            Some(m) => match self.roster(&m.team_id).await {
                Ok(members) => Some(Team {
                    id: m.team_id,
                    name: m.name,
                    created_by: m.created_by,
                    max_members: m.max_members,
                    members,
                }),
                Err(e) => {
                    warn!("[Profiles] Failed to fetch roster {}: {:#}", m.team_id, e);
                    None
                }
            },
            None => None,
        };

        ParticipantOverview { profile, team }
    }

    pub async fn create_profile(&self, user_id: &str, new: &NewProfile) -> Result<Profile> {
        {
            let mut conn = self.db.pool().acquire().await?;
            self.create_profile_with(&mut conn, user_id, new).await?;
        }

        self.profile(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile vanished after insert"))
    }

    /// Insert the profile on `conn`, so registration can run it inside the
    /// same transaction as the account.
    pub async fn create_profile_with(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        new: &NewProfile,
    ) -> Result<Role> {
        let role = new.role.unwrap_or(Role::Participant);

        sqlx::query(
            r#"
            INSERT INTO profiles (id, name, email, phone, experience, skills, tshirt, dietary, type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(present(&new.name))
        .bind(present(&new.email))
        .bind(present(&new.phone))
        .bind(present(&new.experience))
        .bind(present(&new.skills))
        .bind(present(&new.tshirt))
        .bind(present(&new.dietary))
        .bind(role.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await
        .context("Failed to create profile")?;

        info!("[Profiles] Profile created for {} ({})", user_id, role);
        Ok(role)
    }

    pub async fn create_team(
        &self,
        name: &str,
        created_by: Option<&str>,
        max_members: i64,
    ) -> Result<Team> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Team name is required"));
        }
        if max_members < 1 {
            return Err(anyhow::anyhow!("A team needs room for at least one member"));
        }

        let team = Team {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_by: created_by.map(str::to_string),
            max_members,
            members: Vec::new(),
        };

        sqlx::query(
            "INSERT INTO teams (id, name, created_by, max_members, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&team.id)
        .bind(&team.name)
        .bind(&team.created_by)
        .bind(team.max_members)
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await
        .with_context(|| format!("Failed to create team {}", team.name))?;

        info!("[Profiles] Team created: {}", team.name);
        Ok(team)
    }

    /// A profile joins at most one team, and never a full one.
    pub async fn add_member(&self, team_id: &str, user_id: &str) -> Result<()> {
        let pool = self.db.pool();

        let team: Option<(i64,)> = sqlx::query_as("SELECT max_members FROM teams WHERE id = ?")
            .bind(team_id)
            .fetch_optional(pool)
            .await?;
        let (max_members,) = team.ok_or_else(|| anyhow::anyhow!("Team not found"))?;

        if self.profile(user_id).await?.is_none() {
            return Err(anyhow::anyhow!("Profile not found"));
        }

        if self.membership(user_id).await?.is_some() {
            return Err(anyhow::anyhow!("User already belongs to a team"));
        }

        // Capacity is checked inside the insert itself so concurrent joins
        // cannot overfill the team.
        let inserted = sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, joined_at)
            SELECT ?, ?, ?
            WHERE (SELECT COUNT(*) FROM team_members WHERE team_id = ?) < ?
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(Utc::now().to_rfc3339())
        .bind(team_id)
        .bind(max_members)
        .execute(pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(anyhow::anyhow!("Team is full"));
        }

        info!("[Profiles] {} joined team {}", user_id, team_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn manager() -> ProfileManager {
        ProfileManager::new(Database::in_memory().await.unwrap())
    }

    fn named(name: &str, email: &str) -> NewProfile {
        NewProfile {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            role: Some(Role::Participant),
            ..NewProfile::default()
        }
    }

    #[tokio::test]
    async fn test_missing_profile_is_empty_overview() {
        let profiles = manager().await;
        let overview = profiles.participant_overview("ghost").await;
        assert_eq!(overview, ParticipantOverview::default());
    }

    #[tokio::test]
    async fn test_blank_fields_stored_as_absent() {
        let profiles = manager().await;
        let mut new = named("Ada", "ada@x.io");
        new.dietary = Some("  ".to_string());
        new.phone = Some(String::new());

        let profile = profiles.create_profile("u1", &new).await.unwrap();
        assert_eq!(profile.dietary, None);
        assert_eq!(profile.phone, None);
        assert_eq!(profile.dietary_label(), "None");
        assert_eq!(profile.role, Some(Role::Participant));
    }

    #[tokio::test]
    async fn test_no_membership_means_no_team() {
        let profiles = manager().await;
        profiles.create_profile("u1", &named("Ada", "ada@x.io")).await.unwrap();

        let overview = profiles.participant_overview("u1").await;
        assert!(overview.profile.is_some());
        assert!(overview.team.is_none());
    }

    #[tokio::test]
    async fn test_roster_in_join_order() {
        let profiles = manager().await;
        profiles.create_profile("u1", &named("Ada", "ada@x.io")).await.unwrap();
        profiles.create_profile("u2", &named("Grace", "grace@x.io")).await.unwrap();
        let team = profiles.create_team("Rustaceans", Some("u1"), 4).await.unwrap();

        profiles.add_member(&team.id, "u1").await.unwrap();
        profiles.add_member(&team.id, "u2").await.unwrap();

        let overview = profiles.participant_overview("u2").await;
        let team = overview.team.unwrap();
        assert_eq!(team.name, "Rustaceans");
        assert_eq!(team.max_members, 4);
        let names: Vec<_> = team.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Grace"]);
    }

    #[tokio::test]
    async fn test_one_team_per_profile_and_capacity() {
        let profiles = manager().await;
        for (id, name) in [("u1", "A"), ("u2", "B"), ("u3", "C")] {
            profiles
                .create_profile(id, &named(name, &format!("{}@x.io", id)))
                .await
                .unwrap();
        }
        let small = profiles.create_team("Small", None, 1).await.unwrap();
        let other = profiles.create_team("Other", None, 4).await.unwrap();

        profiles.add_member(&small.id, "u1").await.unwrap();
        assert!(profiles.add_member(&small.id, "u2").await.is_err());
        assert!(profiles.add_member(&other.id, "u1").await.is_err());
        assert!(profiles.add_member(&other.id, "nobody").await.is_err());
        profiles.add_member(&other.id, "u3").await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_respect_capacity() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("teams.sqlite").display());
        let profiles = std::sync::Arc::new(ProfileManager::new(Database::open(&url).await.unwrap()));

        let team = profiles.create_team("Solo", None, 1).await.unwrap();
        for i in 0..8 {
            let id = format!("u{}", i);
            profiles
                .create_profile(&id, &named(&id, &format!("{}@x.io", id)))
                .await
                .unwrap();
        }

        let joins: Vec<_> = (0..8)
            .map(|i| {
                let profiles = profiles.clone();
                let team_id = team.id.clone();
                tokio::spawn(async move { profiles.add_member(&team_id, &format!("u{}", i)).await })
            })
            .collect();

        let mut joined = 0;
        for join in joins {
            if join.await.unwrap().is_ok() {
                joined += 1;
            }
        }

        assert_eq!(joined, 1);
        assert_eq!(profiles.roster(&team.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_team_validation() {
        let profiles = manager().await;
        assert!(profiles.create_team("   ", None, 4).await.is_err());
        assert!(profiles.create_team("Zero", None, 0).await.is_err());
        profiles.create_team("Dup", None, 4).await.unwrap();
        assert!(profiles.create_team("Dup", None, 4).await.is_err());
    }
}
