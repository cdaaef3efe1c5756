use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

const SECONDS_PER_DAY: i32 = 86_400;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub voting: VotingConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let configured_path =
            std::env::var("LUNCH_VOTE_CONFIG").unwrap_or_else(|_| "config/api.toml".to_string());
        assert!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        assert!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("LUNCH_VOTE_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/api.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize API configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(anyhow!("Database URL must be specified"));
        }
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than zero"));
        }
        let min_connections = self.database.min_connections.unwrap_or(1);
        if self.database.max_connections < min_connections {
            return Err(anyhow!(
                "database.max_connections ({}) must be >= min_connections ({min_connections})",
                self.database.max_connections
            ));
        }
        self.voting.offset()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        SocketAddr::new(host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: Option<u32>,
    pub acquire_timeout_ms: Option<u64>,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        let millis = self.acquire_timeout_ms.unwrap_or(10_000);
        assert!(millis >= 100, "Acquire timeout must be at least 100ms");
        Duration::from_millis(millis)
    }
}

/// Settings for deciding what "today" means when votes are cast and tallied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VotingConfig {
    /// Offset from UTC of the office the lunch vote runs for.
    #[serde(default)]
    pub utc_offset_seconds: i32,
}

impl VotingConfig {
    pub fn offset(&self) -> Result<FixedOffset> {
        if self.utc_offset_seconds.abs() >= SECONDS_PER_DAY {
            return Err(anyhow!(
                "voting.utc_offset_seconds must be within one day, got {}",
                self.utc_offset_seconds
            ));
        }
        FixedOffset::east_opt(self.utc_offset_seconds)
            .ok_or_else(|| anyhow!("Invalid UTC offset {}", self.utc_offset_seconds))
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
