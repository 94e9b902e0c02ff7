use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Server settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("FAREWELL_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("FAREWELL_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("FAREWELL_PORT must be a port number")?;
        let db_path = get("FAREWELL_DB_PATH").unwrap_or_else(|| "farewell.db".into()).into();
        let media_dir = get("FAREWELL_MEDIA_DIR").unwrap_or_else(|| "./media".into()).into();
        let max_upload_mb: usize = get("FAREWELL_MAX_UPLOAD_MB")
            .unwrap_or_else(|| "64".into())
            .parse()
            .context("FAREWELL_MAX_UPLOAD_MB must be a whole number")?;

        Ok(Self {
            host,
            port,
            db_path,
            media_dir,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
