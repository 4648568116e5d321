use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default upstream icon search API.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.iconfinder.com/v4";

/// Server configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: PathBuf,
    pub upstream_url: String,
    pub api_key: Option<String>,
    pub search_count: Option<u32>,
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listen_addr = var("ICONSEEK_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("ICONSEEK_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let db_path = var("ICONSEEK_DB_PATH")
            .unwrap_or_else(|| "./iconseek.redb".to_string())
            .into();

        let upstream_url = var("ICONSEEK_UPSTREAM_URL")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        if !upstream_url.starts_with("http://") && !upstream_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "ICONSEEK_UPSTREAM_URL",
                "must start with http:// or https://",
            ));
        }

        // Left unset, the server still starts; the proxy answers 400.
        let api_key = var("ICONSEEK_API_KEY").filter(|s| !s.trim().is_empty());

        let search_count = match var("ICONSEEK_SEARCH_COUNT") {
            Some(s) if !s.is_empty() => match s.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(ConfigError::Invalid(
                        "ICONSEEK_SEARCH_COUNT",
                        "must be a positive integer",
                    ))
                }
            },
            _ => None,
        };

        let upstream_timeout = var("ICONSEEK_UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| {
                ConfigError::Invalid(
                    "ICONSEEK_UPSTREAM_TIMEOUT_SECS",
                    "must be a whole number of seconds",
                )
            })?;

        Ok(Config {
            listen_addr,
            db_path,
            upstream_url,
            api_key,
            search_count,
            upstream_timeout,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}
