//! Hackathon server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::admin::AdminManager;
use crate::core::auth::AuthManager;
use crate::core::db::Database;
use crate::profiles::ProfileManager;
use crate::volunteer::VolunteerManager;

/// Name of the cookie (and of the client-side session blob) holding the session.
pub const SESSION_KEY: &str = "user";

/// Configuration for the hackathon server
#[derive(Clone, Debug)]
pub struct HackathonConfig {
    /// Root directory for the SQLite database
    pub data_dir: PathBuf,
    /// Port to listen on
    pub port: u16,
    /// Session lifetime in days
    pub session_days: i64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Bootstrap admin account, created on startup when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Log level for the fmt subscriber
    pub log_level: String,
}

impl Default for HackathonConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::var("HACKATHON_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("hackathon_data")),
            port: env_parse("HACKATHON_PORT").unwrap_or(3001),
            session_days: env_parse("HACKATHON_SESSION_DAYS").unwrap_or(30),
            bcrypt_cost: env_parse("HACKATHON_BCRYPT_COST").unwrap_or(bcrypt::DEFAULT_COST),
            admin_email: std::env::var("HACKATHON_ADMIN_EMAIL").ok(),
            admin_password: std::env::var("HACKATHON_ADMIN_PASSWORD").ok(),
            log_level: std::env::var("HACKATHON_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl HackathonConfig {
    /// Create config with custom base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn database_url(&self) -> String {
        format!(
            "sqlite://{}",
            self.data_dir
                .join("hackathon.sqlite")
                .to_string_lossy()
                .replace('\\', "/")
        )
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Ensure the data directory exists
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: HackathonConfig,
    pub db: Database,
    pub auth: Arc<AuthManager>,
    pub profiles: Arc<ProfileManager>,
    pub volunteers: Arc<VolunteerManager>,
    pub admin: Arc<AdminManager>,
}

impl AppState {
    pub fn new(config: HackathonConfig, db: Database) -> Self {
        Self {
            auth: Arc::new(
                AuthManager::new(db.clone(), config.session_days)
                    .with_bcrypt_cost(config.bcrypt_cost),
            ),
            profiles: Arc::new(ProfileManager::new(db.clone())),
            volunteers: Arc::new(VolunteerManager::new(db.clone())),
            admin: Arc::new(AdminManager::new(db.clone())),
            config,
            db,
        }
    }
}
