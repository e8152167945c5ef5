use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::SessionStore;
use crate::core::config::SESSION_KEY;
use crate::core::models::Session;

#[derive(Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session) -> Result<()> {
        *self.session.write() = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.read().clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.session.write() = None;
        Ok(())
    }
}

/// One JSON blob at `<dir>/user.json`.
///
/// A missing or unreadable blob loads as "no session".
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", SESSION_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(session)?;
        // Write-then-rename so a crash never leaves half a blob behind.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {:?}", tmp))?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("[Session] Saved session for {}", session.email);
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("[Session] Ignoring corrupt session blob {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Role;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            user_id: "u1".into(),
            email: "ada@x.io".into(),
            role: Some(Role::Both),
            is_admin: false,
            token: Some("tok".into()),
        }
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().await.unwrap(), None);
        store.save(&session()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session()));
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        JsonFileSessionStore::new(dir.path())
            .save(&session())
            .await
            .unwrap();

        let store = JsonFileSessionStore::new(dir.path());
        assert!(store.path().ends_with("user.json"));
        assert_eq!(store.load().await.unwrap(), Some(session()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // Clearing twice is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_corrupt_blob_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
