//! Client configuration.
//!
//! Loaded from an optional `voyatek.toml` and then from `VOYATEK__*`
//! environment variables, e.g. `VOYATEK__API__BASE_URL`. Every key has a
//! default, so an empty environment yields a working configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "voyatek.toml";
const ENV_PREFIX: &str = "VOYATEK";
const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub countries: CountriesConfig,
}

/// Backend location and request timeouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountriesConfig {
    /// Replaces the bundled country list when set.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://voyatek-tst.free.beeceptor.com/api".to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ClientConfig {
    /// Load `voyatek.toml` from the working directory (if present) and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Like `load`, reading the file at `path` instead of the default.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);

        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::from(file)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.api.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be an http or https URL, got '{base_url}'"
            )));
        }

        let connect = self.api.connect_timeout_secs;
        let request = self.api.request_timeout_secs;
        if !(1..=300).contains(&connect) || !(1..=300).contains(&request) {
            return Err(ConfigError::Invalid(
                "timeouts must be between 1 and 300 seconds".to_string(),
            ));
        }
        if connect > request {
            return Err(ConfigError::Invalid(
                "api.connect_timeout_secs cannot exceed api.request_timeout_secs".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "invalid log level '{}', expected one of: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_reference_timeouts() {
        let config = ClientConfig::default();
        assert_eq!(config.api.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.api.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.logging.level, "info");
        assert!(config.countries.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://example.com".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn rejects_connect_longer_than_request() {
        let mut config = ClientConfig::default();
        config.api.connect_timeout_secs = 90;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = ClientConfig::default();
        config.logging.level = "loud".into();
        assert!(config.validate().unwrap_err().to_string().contains("invalid log level"));
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]").unwrap();
        writeln!(file, "base_url = \"http://localhost:3000\"").unwrap();
        writeln!(file, "request_timeout_secs = 45").unwrap();

        let config = ClientConfig::load_from(Some(file.path())).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.request_timeout_secs, 45);
        assert_eq!(config.api.connect_timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = ClientConfig::load_from(Some(Path::new("/nonexistent/voyatek.toml"))).unwrap();
        assert_eq!(config.api, ApiConfig::default());
    }
}
