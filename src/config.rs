use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::services::mutations::RollbackPolicy;

/// The API every data operation goes to.
pub const DEFAULT_API_URL: &str = "https://linked-posts.routemisr.com";
/// Posts requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// The client's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The base URL of the remote API.
    pub api_url: String,
    /// The page size used for every feed request.
    pub page_size: u32,
    /// Where the session credential is persisted.
    pub session_file: PathBuf,
    /// What to do with an optimistic change when its remote call fails.
    pub rollback: RollbackPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            session_file: PathBuf::from(".nexora/session"),
            rollback: RollbackPolicy::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let page_size: u32 = match env::var("NEXORA_PAGE_SIZE") {
            Ok(raw) => raw.parse().context("Invalid NEXORA_PAGE_SIZE")?,
            Err(_) => defaults.page_size,
        };
        if page_size == 0 {
            anyhow::bail!("NEXORA_PAGE_SIZE must be greater than zero");
        }

        let rollback = match env::var("NEXORA_ROLLBACK") {
            Ok(raw) => raw
                .parse::<RollbackPolicy>()
                .map_err(anyhow::Error::msg)
                .context("Invalid NEXORA_ROLLBACK (expected `revert` or `keep`)")?,
            Err(_) => defaults.rollback,
        };

        Ok(Self {
            api_url: env::var("NEXORA_API_URL").unwrap_or(defaults.api_url),
            page_size,
            session_file: env::var("NEXORA_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            rollback,
        })
    }
}
