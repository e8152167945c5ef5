//! Authentication Module
//!
//! Handles account creation, sign-in, sign-out and session validation.
//! Sessions live in the `sessions` table keyed by the SHA-256 of the bearer
//! token; the raw token only ever exists on the client.
//!
//! Sign-in and sign-out are published as [`AuthEvent`]s to every live
//! [`AuthSubscription`].

pub mod handlers;
pub mod middleware;

use std::sync::OnceLock;

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqliteConnection;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::db::Database;
use crate::core::models::Role;

/// Account record (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated server-side session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    pub email: String,
    /// Role read from the profile at sign-in; fixed for the session's lifetime
    pub role: Option<Role>,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: String },
    /// Carries the hash of the ended session's token, so holders of another
    /// session for the same account can tell it is not theirs.
    SignedOut { user_id: String, token_hash: String },
}

/// Live subscription to auth notifications.
///
/// Dropping the subscription unsubscribes it.
pub struct AuthSubscription {
    rx: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Next event, or `None` once the gateway has shut down.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("[Auth] Subscriber lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Auth manager handles all authentication
pub struct AuthManager {
    db: Database,
    session_days: i64,
    bcrypt_cost: u32,
    events: broadcast::Sender<AuthEvent>,
    /// Verified against when the email is unknown, so both failures cost a bcrypt check
    dummy_hash: OnceLock<String>,
}

impl AuthManager {
    pub fn new(db: Database, session_days: i64) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            db,
            session_days,
            bcrypt_cost: DEFAULT_COST,
            events,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Override the bcrypt work factor (tests use the minimum).
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            rx: self.events.subscribe(),
        }
    }

    fn dummy_hash(&self) -> Result<&str> {
        if let Some(dummy) = self.dummy_hash.get() {
            return Ok(dummy);
        }
        let dummy = hash(Uuid::new_v4().simple().to_string(), self.bcrypt_cost)
            .context("Failed to hash password")?;
        Ok(self.dummy_hash.get_or_init(|| dummy))
    }

    fn publish(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Register a new account
    pub async fn sign_up(&self, email: &str, password: &str, is_admin: bool) -> Result<AuthUser> {
        let mut conn = self.db.pool().acquire().await?;
        self.sign_up_with(&mut conn, email, password, is_admin).await
    }

    /// Register on `conn`, so the account can share a transaction with the
    /// rows created alongside it.
    pub async fn sign_up_with(
        &self,
        conn: &mut SqliteConnection,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<AuthUser> {
        let email = email.trim().to_ascii_lowercase();

        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&mut *conn)
            .await?;

        if existing.is_some() {
            return Err(anyhow::anyhow!("Email already registered"));
        }

        let password_hash =
            hash(password, self.bcrypt_cost).context("Failed to hash password")?;

        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email,
            is_admin,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, is_admin, created_at, is_active) VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(user.is_admin)
        .bind(user.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;

        info!("[Auth] Account created: {}", user.email);

        Ok(user)
    }

    /// Create the configured admin account if it does not exist yet
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<()> {
        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email.trim().to_ascii_lowercase())
            .fetch_optional(self.db.pool())
            .await?;

        match existing {
            Some((id,)) => {
                sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
                    .bind(id)
                    .execute(self.db.pool())
                    .await?;
            }
            None => {
                self.sign_up(email, password, true).await?;
            }
        }
        Ok(())
    }

    /// Verify credentials and open a session. Returns the account and the raw token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(AuthUser, String)> {
        let pool = self.db.pool();
        let email = email.trim().to_ascii_lowercase();

        let row: Option<(String, String, String, bool, String)> = sqlx::query_as(
            "SELECT id, email, password_hash, is_admin, created_at FROM users WHERE email = ? AND is_active = 1",
        )
        .bind(&email)
        .fetch_optional(pool)
        .await?;

        let Some((user_id, email, password_hash, is_admin, created_at)) = row else {
            let _ = verify(password, self.dummy_hash()?);
            warn!("[Auth] Failed sign-in attempt for unknown {}", email);
            return Err(anyhow::anyhow!("Invalid email or password"));
        };

        let valid = verify(password, &password_hash).context("Failed to verify password")?;
        if !valid {
            warn!("[Auth] Failed sign-in attempt for {}", email);
            return Err(anyhow::anyhow!("Invalid email or password"));
        }

        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(&user_id)
            .execute(pool)
            .await?;

        let role = self.current_role(&user_id).await?;
        let token = self.create_session(&user_id, role).await?;

        let user = AuthUser {
            id: user_id,
            email,
            is_admin,
            created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
        };

        info!("[Auth] Signed in: {}", user.email);
        self.publish(AuthEvent::SignedIn {
            user_id: user.id.clone(),
        });

        Ok((user, token))
    }

    async fn create_session(&self, user_id: &str, role: Option<Role>) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.session_days);

        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, role, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(role.map(|r| r.as_str()))
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;

        Ok(token)
    }

    /// Role tag currently stored on the user's profile
    pub async fn current_role(&self, user_id: &str) -> Result<Option<Role>> {
        let row: Option<(Option<String>,)> = sqlx::query_as("SELECT type FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.and_then(|(tag,)| tag).and_then(|tag| Role::parse(&tag)))
    }

    /// Validate a bearer token. Expired sessions are deleted.
    pub async fn validate_session(&self, token: &str) -> Result<SessionRecord> {
        let token_hash = hash_token(token);

        let row: Option<(String, String, Option<String>, bool, String)> = sqlx::query_as(
            r#"
            SELECT u.id, u.email, s.role, u.is_admin, s.expires_at
            FROM users u
            JOIN sessions s ON u.id = s.user_id
            WHERE s.token_hash = ? AND u.is_active = 1
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(self.db.pool())
        .await?;

        let (user_id, email, role, is_admin, expires_at) =
            row.ok_or_else(|| anyhow::anyhow!("Invalid or expired session"))?;

        let expires_at: DateTime<Utc> = expires_at
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid date"))?;

        if expires_at <= Utc::now() {
            debug!("[Auth] Session for {} expired", email);
            sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
                .bind(&token_hash)
                .execute(self.db.pool())
                .await?;
            return Err(anyhow::anyhow!("Invalid or expired session"));
        }

        Ok(SessionRecord {
            user_id,
            email,
            role: role.as_deref().and_then(Role::parse),
            is_admin,
            expires_at,
        })
    }

    /// Invalidate a session. Unknown tokens are a no-op.
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        let token_hash = hash_token(token);
        let row: Option<(String,)> =
            sqlx::query_as("DELETE FROM sessions WHERE token_hash = ? RETURNING user_id")
                .bind(&token_hash)
                .fetch_optional(self.db.pool())
                .await?;

        if let Some((user_id,)) = row {
            info!("[Auth] Session invalidated for {}", user_id);
            self.publish(AuthEvent::SignedOut {
                user_id,
                token_hash,
            });
        }

        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<AuthUser> {
        let row: Option<(String, String, bool, String)> = sqlx::query_as(
            "SELECT id, email, is_admin, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        let (id, email, is_admin, created_at) =
            row.ok_or_else(|| anyhow::anyhow!("User not found"))?;

        Ok(AuthUser {
            id,
            email,
            is_admin,
            created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn manager() -> AuthManager {
        let db = Database::in_memory().await.unwrap();
        AuthManager::new(db, 30).with_bcrypt_cost(4)
    }

    async fn set_role(manager: &AuthManager, user_id: &str, role: &str) {
        sqlx::query("INSERT INTO profiles (id, type, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(role)
            .bind(Utc::now().to_rfc3339())
            .execute(manager.db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in() {
        let auth = manager().await;
        let user = auth.sign_up("Ada@Example.com", "hunter22", false).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        set_role(&auth, &user.id, "volunteer").await;

        let (signed_in, token) = auth.sign_in("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(signed_in.id, user.id);

        let session = auth.validate_session(&token).await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Some(Role::Volunteer));
        assert!(!session.is_admin);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let auth = manager().await;
        auth.sign_up("a@b.c", "pw", false).await.unwrap();
        assert!(auth.sign_up("A@B.C", "pw2", false).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let auth = manager().await;
        auth.sign_up("a@b.c", "right", false).await.unwrap();
        assert!(auth.sign_in("a@b.c", "wrong").await.is_err());
        assert!(auth.sign_in("nobody@b.c", "right").await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_email_still_checks_a_hash() {
        let auth = manager().await;
        assert!(auth.dummy_hash.get().is_none());

        let err = auth.sign_in("nobody@b.c", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        let dummy = auth.dummy_hash.get().cloned().unwrap();
        assert!(dummy.starts_with("$2"));
        assert!(!verify("pw", &dummy).unwrap());

        // Built once, then reused.
        assert!(auth.sign_in("other@b.c", "pw").await.is_err());
        assert_eq!(auth.dummy_hash.get(), Some(&dummy));
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_and_notifies() {
        let auth = manager().await;
        let user = auth.sign_up("a@b.c", "pw", false).await.unwrap();
        let mut events = auth.subscribe();

        let (_, token) = auth.sign_in("a@b.c", "pw").await.unwrap();
        assert_eq!(
            events.recv().await,
            Some(AuthEvent::SignedIn {
                user_id: user.id.clone()
            })
        );

        auth.sign_out(&token).await.unwrap();
        assert_eq!(
            events.recv().await,
            Some(AuthEvent::SignedOut {
                user_id: user.id,
                token_hash: hash_token(&token),
            })
        );
        assert!(auth.validate_session(&token).await.is_err());

        // Second sign-out of the same token is silent.
        auth.sign_out(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let db = Database::in_memory().await.unwrap();
        let auth = AuthManager::new(db, 0).with_bcrypt_cost(4);
        auth.sign_up("a@b.c", "pw", false).await.unwrap();
        let (_, token) = auth.sign_in("a@b.c", "pw").await.unwrap();
        assert!(auth.validate_session(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_admin_promotes_existing() {
        let auth = manager().await;
        let user = auth.sign_up("boss@b.c", "pw", false).await.unwrap();
        auth.ensure_admin("boss@b.c", "ignored").await.unwrap();
        assert!(auth.get_user(&user.id).await.unwrap().is_admin);

        auth.ensure_admin("new@b.c", "pw").await.unwrap();
        let (new_admin, _) = auth.sign_in("new@b.c", "pw").await.unwrap();
        assert!(new_admin.is_admin);
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let h = hash_token("abc");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_token("abc"));
        assert_ne!(h, hash_token("abd"));
    }
}
