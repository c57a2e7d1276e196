use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let db_path = std::env::var("FEEDBOARD_DB_PATH").unwrap_or_else(|_| "feedboard.db".into());
        let host = std::env::var("FEEDBOARD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("FEEDBOARD_PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .context("FEEDBOARD_PORT must be a port number")?;

        Ok(Self {
            db_path: db_path.into(),
            host,
            port,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
