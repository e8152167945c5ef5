use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{AuthGateway, SessionStore};
use crate::core::auth::{hash_token, AuthEvent, AuthSubscription};
use crate::core::models::Session;
use crate::routing::{landing_for, Dashboard};

#[derive(Debug, Error)]
pub enum AuthFailure {
    /// Deliberately vague: never reveals which credential was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Could not store session: {0}")]
    Storage(String),
}

/// Single owner of the current session.
///
/// Views receive a `SessionContext` instead of reading the store themselves.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    gateway: Arc<dyn AuthGateway>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>, gateway: Arc<dyn AuthGateway>) -> Self {
        Self { store, gateway }
    }

    /// Sign in, persist the session and return the dashboard to land on.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Dashboard, AuthFailure> {
        let session = self.gateway.sign_in(email, password).await.map_err(|e| {
            warn!("[Session] Sign-in failed for {}: {:#}", email, e);
            AuthFailure::InvalidCredentials
        })?;

        self.store
            .save(&session)
            .await
            .map_err(|e| AuthFailure::Storage(e.to_string()))?;

        info!("[Session] {} signed in as {:?}", session.email, session.role);
        Ok(landing_for(&session))
    }

    /// Always clears the local session and sends the user home, even when the
    /// gateway call fails.
    pub async fn sign_out(&self) -> Dashboard {
        if let Ok(Some(Session {
            token: Some(token), ..
        })) = self.store.load().await
        {
            if let Err(e) = self.gateway.sign_out(&token).await {
                warn!("[Session] Gateway sign-out failed: {:#}", e);
            }
        }

        if let Err(e) = self.store.clear().await {
            warn!("[Session] Failed to clear session: {:#}", e);
        }
        Dashboard::Home
    }

    pub async fn current(&self) -> Option<Session> {
        match self.store.load().await {
            Ok(session) => session,
            Err(e) => {
                warn!("[Session] Failed to load session: {:#}", e);
                None
            }
        }
    }

    /// Re-verify the stored session with the gateway. An invalid session, or one
    /// whose role no longer matches, is cleared.
    pub async fn refresh(&self) -> Option<Session> {
        let local = self.current().await?;
        let Some(token) = local.token.clone() else {
            self.clear().await;
            return None;
        };

        match self.gateway.verify(&token).await {
            Ok(remote) if remote.user_id == local.user_id && remote.role == local.role => {
                Some(local)
            }
            Ok(_) => {
                warn!("[Session] Stored session for {} no longer matches", local.email);
                self.clear().await;
                None
            }
            Err(e) => {
                info!("[Session] Session for {} rejected: {:#}", local.email, e);
                self.clear().await;
                None
            }
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("[Session] Failed to clear session: {:#}", e);
        }
    }

    /// Follow gateway notifications until the subscription ends or the task is
    /// aborted. A sign-out of the stored session's own token clears it; other
    /// sessions of the same account ending leave it alone.
    pub fn watch(self: &Arc<Self>, mut events: AuthSubscription) -> JoinHandle<()> {
        let context = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    AuthEvent::SignedIn { user_id } => {
                        info!("[Session] Gateway reports sign-in for {}", user_id);
                    }
                    AuthEvent::SignedOut {
                        user_id,
                        token_hash,
                    } => {
                        let ours = context
                            .current()
                            .await
                            .and_then(|s| s.token)
                            .is_some_and(|token| hash_token(&token) == token_hash);
                        if ours {
                            info!("[Session] Gateway reports sign-out, clearing session");
                            context.clear().await;
                        } else {
                            info!("[Session] Gateway reports sign-out of another session for {}", user_id);
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::AuthManager;
    use crate::core::db::Database;
    use crate::core::models::Role;
    use crate::session::MemorySessionStore;
    use chrono::Utc;
    use std::time::Duration;

    async fn setup(role: Option<&str>) -> (Arc<AuthManager>, Arc<MemorySessionStore>, SessionContext) {
        let db = Database::in_memory().await.unwrap();
        let auth = Arc::new(AuthManager::new(db.clone(), 30).with_bcrypt_cost(4));
        let user = auth.sign_up("ada@x.io", "pw", false).await.unwrap();
        if let Some(role) = role {
            sqlx::query("INSERT INTO profiles (id, name, type, created_at) VALUES (?, 'Ada', ?, ?)")
                .bind(&user.id)
                .bind(role)
                .bind(Utc::now().to_rfc3339())
                .execute(db.pool())
                .await
                .unwrap();
        }
        let store = Arc::new(MemorySessionStore::new());
        let context = SessionContext::new(store.clone(), auth.clone());
        (auth, store, context)
    }

    #[tokio::test]
    async fn test_sign_in_routes_by_role() {
        for (tag, expected) in [
            ("participant", Dashboard::Participant),
            ("volunteer", Dashboard::Volunteer),
            ("both", Dashboard::Participant),
            ("mentor", Dashboard::Participant),
        ] {
            let (_, store, context) = setup(Some(tag)).await;
            assert_eq!(context.sign_in("ada@x.io", "pw").await.unwrap(), expected);
            let saved = store.load().await.unwrap().unwrap();
            assert_eq!(saved.role, Role::parse(tag));
            assert!(saved.token.is_some());
        }
    }

    #[tokio::test]
    async fn test_bad_credentials_store_nothing() {
        let (_, store, context) = setup(Some("participant")).await;
        let err = context.sign_in("ada@x.io", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_and_goes_home() {
        let (auth, store, context) = setup(Some("volunteer")).await;
        context.sign_in("ada@x.io", "pw").await.unwrap();
        let token = store.load().await.unwrap().unwrap().token.unwrap();

        assert_eq!(context.sign_out().await, Dashboard::Home);
        assert!(context.current().await.is_none());
        assert!(auth.validate_session(&token).await.is_err());

        // Signing out with nothing stored still lands home.
        assert_eq!(context.sign_out().await, Dashboard::Home);
    }

    #[tokio::test]
    async fn test_refresh_drops_revoked_session() {
        let (auth, _, context) = setup(Some("participant")).await;
        context.sign_in("ada@x.io", "pw").await.unwrap();
        assert!(context.refresh().await.is_some());

        let token = context.current().await.unwrap().token.unwrap();
        auth.sign_out(&token).await.unwrap();
        assert!(context.refresh().await.is_none());
        assert!(context.current().await.is_none());
    }

    #[tokio::test]
    async fn test_watch_clears_on_signed_out_event() {
        let (auth, _, context) = setup(Some("participant")).await;
        let context = Arc::new(context);
        let watcher = context.watch(auth.subscribe());

        context.sign_in("ada@x.io", "pw").await.unwrap();
        let token = context.current().await.unwrap().token.unwrap();

        // Signed out elsewhere, e.g. by another page.
        auth.sign_out(&token).await.unwrap();

        let mut cleared = false;
        for _ in 0..50 {
            if context.current().await.is_none() {
                cleared = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(cleared, "session should be cleared by the watcher");
        watcher.abort();
    }

    #[tokio::test]
    async fn test_watch_keeps_session_when_another_device_signs_out() {
        let (auth, _, context) = setup(Some("participant")).await;
        let context = Arc::new(context);
        let mut events = auth.subscribe();
        let watcher = context.watch(auth.subscribe());

        context.sign_in("ada@x.io", "pw").await.unwrap();
        let (_, other) = auth.sign_in("ada@x.io", "pw").await.unwrap();
        auth.sign_out(&other).await.unwrap();

        // Wait until the sign-out has been broadcast, then give the watcher a turn.
        while let Some(event) = events.recv().await {
            if matches!(event, AuthEvent::SignedOut { .. }) {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(context.current().await.is_some());
        assert!(context.refresh().await.is_some());
        watcher.abort();
    }
}
