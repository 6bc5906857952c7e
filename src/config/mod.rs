use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory holding the served HTML pages and their assets.
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            pages_dir: default_pages_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("./public")
}

/// The two signing secrets have no generated fallback. Each deployment must
/// supply its own, via the config file or the HOMEFRONT_TOKEN_SECRET /
/// HOMEFRONT_SESSION_SECRET environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens.
    #[serde(default)]
    pub token_secret: String,
    /// Secret used to sign the session cookie.
    #[serde(default)]
    pub session_secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            session_secret: String::new(),
            token_ttl_minutes: default_token_ttl_minutes(),
        }
    }
}

fn default_token_ttl_minutes() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Seconds between sweeps of expired session entries.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

fn default_cleanup_interval() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str::<Config>(&content).with_context(|| "Failed to parse configuration file")?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        if let Ok(secret) = std::env::var("HOMEFRONT_TOKEN_SECRET") {
            config.auth.token_secret = secret;
        }
        if let Ok(secret) = std::env::var("HOMEFRONT_SESSION_SECRET") {
            config.auth.session_secret = secret;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.auth.token_secret.is_empty() {
            bail!("auth.token_secret is not configured (set it in the config file or HOMEFRONT_TOKEN_SECRET)");
        }
        if self.auth.session_secret.is_empty() {
            bail!("auth.session_secret is not configured (set it in the config file or HOMEFRONT_SESSION_SECRET)");
        }
        if self.auth.token_secret == self.auth.session_secret {
            bail!("auth.token_secret and auth.session_secret must differ");
        }
        if self.auth.token_ttl_minutes == 0 {
            bail!("auth.token_ttl_minutes must be at least 1");
        }
        Ok(())
    }
}
