//! Client-side session handling
//!
//! A [`SessionStore`] persists the signed-in [`Session`] under a fixed key.
//! [`SessionContext`] owns the store and is the only thing that writes to it:
//! it signs in through an [`AuthGateway`], routes the new session to its
//! dashboard, and clears the session on sign-out or when the gateway says so.

pub mod context;
pub mod store;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::auth::AuthManager;
use crate::core::models::Session;

pub use context::{AuthFailure, SessionContext};
pub use store::{JsonFileSessionStore, MemorySessionStore};

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &Session) -> Result<()>;
    async fn load(&self) -> Result<Option<Session>>;
    async fn clear(&self) -> Result<()>;
}

/// Credential check and session lifecycle, seen from the client.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Returns the new session, carrying its token and the profile's role.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
    async fn sign_out(&self, token: &str) -> Result<()>;
    /// Server-side view of the session behind `token`.
    async fn verify(&self, token: &str) -> Result<Session>;
}

#[async_trait]
impl AuthGateway for AuthManager {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let (user, token) = AuthManager::sign_in(self, email, password).await?;
        let role = self.current_role(&user.id).await?;
        Ok(Session {
            user_id: user.id,
            email: user.email,
            role,
            is_admin: user.is_admin,
            token: Some(token),
        })
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        AuthManager::sign_out(self, token).await
    }

    async fn verify(&self, token: &str) -> Result<Session> {
        let record = self.validate_session(token).await?;
        Ok(Session {
            user_id: record.user_id,
            email: record.email,
            role: record.role,
            is_admin: record.is_admin,
            token: Some(token.to_string()),
        })
    }
}
