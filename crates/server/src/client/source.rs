use anyhow::Result;
use async_trait::async_trait;

use super::HackathonClient;
use crate::core::config::AppState;
use crate::core::models::{Registration, Task, TeamSummary, VolunteerProfile, WelcomeMessage};

/// Where dashboard data comes from: the REST API, or the managers directly
/// when rendering inside the server.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn registrations(&self) -> Result<Vec<Registration>>;
    async fn teams(&self) -> Result<Vec<TeamSummary>>;
    async fn welcome_message(&self) -> Result<WelcomeMessage>;
    async fn set_welcome_message(&self, message: &str) -> Result<()>;
    async fn volunteer(&self, id: &str) -> Result<Option<VolunteerProfile>>;
    async fn volunteer_tasks(&self, id: &str) -> Result<Vec<Task>>;
}

#[async_trait]
impl DashboardSource for HackathonClient {
    async fn registrations(&self) -> Result<Vec<Registration>> {
        Ok(HackathonClient::registrations(self).await?)
    }

    async fn teams(&self) -> Result<Vec<TeamSummary>> {
        Ok(HackathonClient::teams(self).await?)
    }

    async fn welcome_message(&self) -> Result<WelcomeMessage> {
        Ok(HackathonClient::welcome_message(self).await?)
    }

    async fn set_welcome_message(&self, message: &str) -> Result<()> {
        HackathonClient::set_welcome_message(self, message).await?;
        Ok(())
    }

    async fn volunteer(&self, id: &str) -> Result<Option<VolunteerProfile>> {
        Ok(Some(HackathonClient::volunteer(self, id).await?))
    }

    async fn volunteer_tasks(&self, id: &str) -> Result<Vec<Task>> {
        Ok(HackathonClient::volunteer_tasks(self, id).await?)
    }
}

#[async_trait]
impl DashboardSource for AppState {
    async fn registrations(&self) -> Result<Vec<Registration>> {
        self.admin.registrations().await
    }

    async fn teams(&self) -> Result<Vec<TeamSummary>> {
        self.admin.teams().await
    }

    async fn welcome_message(&self) -> Result<WelcomeMessage> {
        self.admin.welcome_message().await
    }

    async fn set_welcome_message(&self, message: &str) -> Result<()> {
        self.admin.set_welcome_message(message).await
    }

    async fn volunteer(&self, id: &str) -> Result<Option<VolunteerProfile>> {
        self.volunteers.volunteer(id).await
    }

    async fn volunteer_tasks(&self, id: &str) -> Result<Vec<Task>> {
        self.volunteers.tasks(id).await
    }
}
