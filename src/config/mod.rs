//! Configuration loading and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::calculate::aggregator::{DEFAULT_MAX_TOURNAMENTS, DEFAULT_SETS_PER_PAGE};
use crate::calculate::DEFAULT_MIN_GAMES;
use crate::fetch::{FetcherConfig, DEFAULT_API_URL};
use crate::models::StartggId;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// start.gg API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartggConfig {
    /// GraphQL endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_env() -> String {
    "STARTGG_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("stage-analytics/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for StartggConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl StartggConfig {
    /// Read the API token from the configured environment variable.
    pub fn auth_token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Build the transport configuration. The token is not checked here;
    /// a missing or bad token shows up as an HTTP error on first request.
    pub fn fetcher_config(&self) -> Result<FetcherConfig, ConfigError> {
        Ok(FetcherConfig {
            api_url: parse_api_url(&self.api_url)?,
            auth_token: self.auth_token(),
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
        })
    }
}

fn parse_api_url(api_url: &str) -> Result<Url, ConfigError> {
    Url::parse(api_url)
        .map_err(|e| ConfigError::ValidationError(format!("Invalid api_url {}: {}", api_url, e)))
}

/// Aggregation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// start.gg videogame id (1386 = Super Smash Bros. Ultimate)
    #[serde(default = "default_videogame_id")]
    pub videogame_id: u64,

    /// Minimum games on a stage before it is ranked
    #[serde(default = "default_min_games")]
    pub min_games: u32,

    /// Tournaments scanned per query
    #[serde(default = "default_max_tournaments")]
    pub max_tournaments: u32,

    /// Sets requested per tournament
    #[serde(default = "default_sets_per_page")]
    pub sets_per_page: u32,
}

fn default_videogame_id() -> u64 {
    1386
}

fn default_min_games() -> u32 {
    DEFAULT_MIN_GAMES
}

fn default_max_tournaments() -> u32 {
    DEFAULT_MAX_TOURNAMENTS
}

fn default_sets_per_page() -> u32 {
    DEFAULT_SETS_PER_PAGE
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            videogame_id: default_videogame_id(),
            min_games: default_min_games(),
            max_tournaments: default_max_tournaments(),
            sets_per_page: default_sets_per_page(),
        }
    }
}

impl AnalysisConfig {
    pub fn videogame(&self) -> StartggId {
        StartggId::from(self.videogame_id)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub startgg: StartggConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            startgg: StartggConfig::default(),
            analysis: AnalysisConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.startgg.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "start.gg timeout must be greater than 0".to_string(),
            ));
        }

        parse_api_url(&self.startgg.api_url)?;

        if self.analysis.max_tournaments == 0 {
            return Err(ConfigError::ValidationError(
                "max_tournaments must be greater than 0".to_string(),
            ));
        }

        if self.analysis.sets_per_page == 0 {
            return Err(ConfigError::ValidationError(
                "sets_per_page must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.startgg.api_url, "https://api.start.gg/gql/alpha");
        assert_eq!(config.analysis.videogame_id, 1386);
        assert_eq!(config.analysis.min_games, 5);
        assert_eq!(config.analysis.max_tournaments, 20);
        assert_eq!(config.analysis.sets_per_page, 50);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.startgg.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = AppConfig::default();
        config.startgg.api_url = "not a url".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_validation_zero_tournaments() {
        let mut config = AppConfig::default();
        config.analysis.max_tournaments = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[analysis]
min_games = 10
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.analysis.min_games, 10);
        assert_eq!(config.analysis.max_tournaments, 20);
        assert_eq!(config.startgg.token_env, "STARTGG_API_KEY");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.analysis.videogame_id, 1386);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nmax_tournaments = 0").unwrap();

        assert!(AppConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_fetcher_config_without_token() {
        let mut config = StartggConfig::default();
        config.token_env = "STAGE_ANALYTICS_TEST_UNSET_TOKEN".to_string();

        let fetcher = config.fetcher_config().unwrap();
        assert!(fetcher.auth_token.is_none());
        assert_eq!(fetcher.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.analysis.min_games, parsed.analysis.min_games);
        assert_eq!(config.startgg.api_url, parsed.startgg.api_url);
    }
}
