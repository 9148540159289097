use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub error_file: String,
    pub combined_file: String,
    pub filter: String,
    pub json_console: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub users_file: PathBuf,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("APP_PORT"))
            .unwrap_or_else(|_| "8080".into());
        let port = port
            .parse::<u16>()
            .with_context(|| format!("invalid PORT {port:?}"))?;

        let log = LogConfig {
            dir: std::env::var("LOG_DIR").unwrap_or_else(|_| ".".into()).into(),
            error_file: std::env::var("ERROR_LOG_FILE").unwrap_or_else(|_| "error.log".into()),
            combined_file: std::env::var("COMBINED_LOG_FILE")
                .unwrap_or_else(|_| "combined.log".into()),
            filter: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "user_directory=debug,tower_http=info,access=info".into()),
            json_console: std::env::var("LOG_FORMAT")
                .map(|v| v == "json")
                .unwrap_or(false),
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            users_file: std::env::var("USERS_FILE")
                .unwrap_or_else(|_| "MOCK_DATA.json".into())
                .into(),
            log,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
