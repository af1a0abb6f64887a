use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::error::Result;

/// Durable storage for the session credential (one key, one token).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads the stored credential, if any.
    async fn load(&self) -> Result<Option<String>>;

    /// Persists a credential, replacing any previous one.
    async fn save(&self, token: &str) -> Result<()>;

    /// Removes the stored credential.
    async fn clear(&self) -> Result<()>;
}

/// Stores the token in a single file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let contents = Zeroizing::new(contents);
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, token).await?;
        tracing::debug!("🔑 Session stored at {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!("🧹 Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the token in memory only.
#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<Zeroizing<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(Zeroizing::new(token.into()))),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().await.as_ref().map(|t| t.as_str().to_owned()))
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().await = Some(Zeroizing::new(token.to_string()));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.lock().await = None;
        Ok(())
    }
}
