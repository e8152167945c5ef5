//! Dashboard data assembly
//!
//! Independent reads go out together and are awaited jointly. A failed read
//! is logged and leaves its section empty; nothing is retried.

use serde::Serialize;
use tracing::warn;

use super::DashboardSource;
use crate::core::models::{Registration, Task, TeamSummary, VolunteerProfile};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminDashboardData {
    pub registrations: Vec<Registration>,
    pub teams: Vec<TeamSummary>,
    pub welcome_message: String,
}

impl AdminDashboardData {
    pub async fn load<S: DashboardSource + ?Sized>(source: &S) -> Self {
        let (registrations, teams, welcome) = futures::join!(
            source.registrations(),
            source.teams(),
            source.welcome_message()
        );

        Self {
            registrations: registrations.unwrap_or_else(|e| {
                warn!("[Dashboard] Failed to fetch registrations: {:#}", e);
                Vec::new()
            }),
            teams: teams.unwrap_or_else(|e| {
                warn!("[Dashboard] Failed to fetch teams: {:#}", e);
                Vec::new()
            }),
            welcome_message: welcome.map(|w| w.message).unwrap_or_else(|e| {
                warn!("[Dashboard] Failed to fetch welcome message: {:#}", e);
                String::new()
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolunteerDashboardData {
    pub volunteer: Option<VolunteerProfile>,
    pub tasks: Vec<Task>,
}

impl VolunteerDashboardData {
    pub async fn load<S: DashboardSource + ?Sized>(source: &S, id: &str) -> Self {
        let (volunteer, tasks) = futures::join!(source.volunteer(id), source.volunteer_tasks(id));

        Self {
            volunteer: volunteer.unwrap_or_else(|e| {
                warn!("[Dashboard] Failed to fetch volunteer {}: {:#}", id, e);
                None
            }),
            tasks: tasks.unwrap_or_else(|e| {
                warn!("[Dashboard] Failed to fetch tasks for {}: {:#}", id, e);
                Vec::new()
            }),
        }
    }
}

/// Outcome of a write, shown to the user once. No rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    WelcomeMessageUpdated,
    WelcomeMessageFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::WelcomeMessageUpdated => "Welcome message updated successfully!",
            Notice::WelcomeMessageFailed => "Failed to update welcome message",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::WelcomeMessageFailed)
    }
}

pub async fn update_welcome_message<S: DashboardSource + ?Sized>(source: &S, message: &str) -> Notice {
    match source.set_welcome_message(message).await {
        Ok(()) => Notice::WelcomeMessageUpdated,
        Err(e) => {
            warn!("[Dashboard] Failed to update welcome message: {:#}", e);
            Notice::WelcomeMessageFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::WelcomeMessage;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::Utc;

    /// Source whose admin reads fail selectively.
    #[derive(Default)]
    struct FlakySource {
        fail_registrations: bool,
        fail_teams: bool,
        fail_welcome: bool,
    }

    #[async_trait]
    impl DashboardSource for FlakySource {
        async fn registrations(&self) -> Result<Vec<Registration>> {
            if self.fail_registrations {
                return Err(anyhow!("connection reset"));
            }
            Ok(vec![Registration {
                id: "r1".into(),
                name: "Ada".into(),
                email: "ada@x.io".into(),
                team: None,
                experience: None,
                created_at: Some(Utc::now()),
            }])
        }

        async fn teams(&self) -> Result<Vec<TeamSummary>> {
            if self.fail_teams {
                return Err(anyhow!("503"));
            }
            Ok(vec![TeamSummary {
                name: "Crabs".into(),
                members: vec![],
            }])
        }

        async fn welcome_message(&self) -> Result<WelcomeMessage> {
            if self.fail_welcome {
                return Err(anyhow!("timeout"));
            }
            Ok(WelcomeMessage {
                message: "hi".into(),
            })
        }

        async fn set_welcome_message(&self, _message: &str) -> Result<()> {
            if self.fail_welcome {
                return Err(anyhow!("timeout"));
            }
            Ok(())
        }

        async fn volunteer(&self, _id: &str) -> Result<Option<VolunteerProfile>> {
            Err(anyhow!("down"))
        }

        async fn volunteer_tasks(&self, _id: &str) -> Result<Vec<Task>> {
            Ok(vec![Task {
                id: "t1".into(),
                name: "Badges".into(),
                description: None,
                time: None,
                location: None,
            }])
        }
    }

    #[tokio::test]
    async fn test_admin_all_reads_succeed() {
        let data = AdminDashboardData::load(&FlakySource::default()).await;
        assert_eq!(data.registrations.len(), 1);
        assert_eq!(data.teams.len(), 1);
        assert_eq!(data.welcome_message, "hi");
    }

    #[tokio::test]
    async fn test_admin_partial_failure_keeps_the_rest() {
        let source = FlakySource {
            fail_registrations: true,
            fail_welcome: true,
            ..FlakySource::default()
        };
        let data = AdminDashboardData::load(&source).await;
        assert!(data.registrations.is_empty());
        assert_eq!(data.teams.len(), 1);
        assert_eq!(data.welcome_message, "");
    }

    #[tokio::test]
    async fn test_volunteer_partial_failure() {
        let data = VolunteerDashboardData::load(&FlakySource::default(), "v1").await;
        assert!(data.volunteer.is_none());
        assert_eq!(data.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_update_notice() {
        let ok = update_welcome_message(&FlakySource::default(), "x").await;
        assert_eq!(ok.message(), "Welcome message updated successfully!");
        assert!(!ok.is_error());

        let failing = FlakySource {
            fail_welcome: true,
            ..FlakySource::default()
        };
        let failed = update_welcome_message(&failing, "x").await;
        assert_eq!(failed.message(), "Failed to update welcome message");
        assert!(failed.is_error());
    }
}
