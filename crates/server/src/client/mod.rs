//! Typed client for the site's REST endpoints
//!
//! Used to assemble dashboards from the JSON API, and as an [`AuthGateway`]
//! for a [`SessionContext`](crate::session::SessionContext) living outside
//! the server process.

pub mod dashboard;
pub mod generation;
pub mod source;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::auth::handlers::auth::{LoginRequest, LoginResponse, LogoutResponse};
use crate::core::models::{
    Registration, Session, Task, TeamSummary, VolunteerProfile, WelcomeMessage,
};
use crate::profiles::ParticipantOverview;
use crate::session::AuthGateway;

pub use dashboard::{AdminDashboardData, Notice, VolunteerDashboardData};
pub use generation::{LoadTicket, ViewGeneration, ViewState};
pub use source::DashboardSource;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{method} {path} returned {status}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Clone, Debug)]
pub struct HackathonClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl HackathonClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base, path));
        match token.or(self.token.as_deref()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<T> {
        debug!("[Client] {} {}", method, path);

        let mut builder = self.request(method.clone(), path, token);
        if let Some(body) = body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                method,
                path: path.to_string(),
                status,
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, None, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_vec(body)?;
        self.send(Method::POST, path, None, Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &body).await
    }

    pub async fn logout(&self, token: &str) -> Result<LogoutResponse> {
        self.send(Method::POST, "/auth/logout", Some(token), None)
            .await
    }

    pub async fn me(&self, token: &str) -> Result<Session> {
        self.send(Method::GET, "/auth/me", Some(token), None).await
    }

    pub async fn participant_overview(&self) -> Result<ParticipantOverview> {
        self.get("/api/participant/me").await
    }

    pub async fn registrations(&self) -> Result<Vec<Registration>> {
        self.get("/api/admin/registrations").await
    }

    pub async fn teams(&self) -> Result<Vec<TeamSummary>> {
        self.get("/api/admin/teams").await
    }

    pub async fn welcome_message(&self) -> Result<WelcomeMessage> {
        self.get("/api/admin/welcome-message").await
    }

    pub async fn set_welcome_message(&self, message: &str) -> Result<WelcomeMessage> {
        let body = WelcomeMessage {
            message: message.to_string(),
        };
        self.post("/api/admin/welcome-message", &body).await
    }

    pub async fn volunteer(&self, id: &str) -> Result<VolunteerProfile> {
        self.get(&format!("/api/volunteer/{}", id)).await
    }

    pub async fn volunteer_tasks(&self, id: &str) -> Result<Vec<Task>> {
        self.get(&format!("/api/volunteer/{}/tasks", id)).await
    }
}

#[async_trait]
impl AuthGateway for HackathonClient {
    async fn sign_in(&self, email: &str, password: &str) -> AnyResult<Session> {
        let response = self.login(email, password).await?;
        Ok(Session {
            user_id: response.user_id,
            email: response.email,
            role: response.role,
            is_admin: response.is_admin,
            token: Some(response.token),
        })
    }

    async fn sign_out(&self, token: &str) -> AnyResult<()> {
        self.logout(token).await?;
        Ok(())
    }

    async fn verify(&self, token: &str) -> AnyResult<Session> {
        let mut session = self.me(token).await?;
        session.token = Some(token.to_string());
        Ok(session)
    }
}
