//! Configuration management for postsync

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::store::DEFAULT_EVENT_CAPACITY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root; operation paths such as `/posts` are appended to it
    pub base_url: String,
    /// Per-request timeout, humantime syntax ("10s", "500ms")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Store events buffered per subscriber
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_timeout() -> String {
    "10s".to_string()
}

fn default_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
                timeout: default_timeout(),
            },
            events: EventsConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Parse the configured timeout
    pub fn request_timeout(&self) -> Result<Duration> {
        let timeout = humantime::parse_duration(&self.timeout).map_err(|e| {
            ConfigError::InvalidValue {
                field: "api.timeout".to_string(),
                reason: e.to_string(),
            }
        })?;

        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(timeout)
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file at the default location yields the defaults; a file
    /// named by `POSTSYNC_CONFIG` must exist. `POSTSYNC_API_URL` overrides
    /// `api.base_url` either way.
    pub fn load() -> Result<Self> {
        Self::resolve(None)?.validated()
    }

    /// Locate, read and apply env overrides without validating
    ///
    /// `explicit` (a `--config` argument, tilde-expanded) takes precedence
    /// over `POSTSYNC_CONFIG`; either one must name an existing file. Callers
    /// layering their own overrides validate afterwards.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::read_from_path(&expand_path(path))?,
            None => {
                let explicit = std::env::var_os("POSTSYNC_CONFIG").is_some();
                let config_path = resolve_config_path()?;
                if explicit || config_path.exists() {
                    Self::read_from_path(&config_path)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(config.with_env_overrides())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        Self::read_from_path(path)?.validated()
    }

    /// Read and parse a file without validating it
    pub fn read_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("POSTSYNC_API_URL") {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        self
    }

    /// Check field values
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("api.base_url".to_string()).into());
        }
        self.api.request_timeout()?;
        if self.events.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.capacity".to_string(),
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// Resolve the configuration file path under the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("POSTSYNC_CONFIG") {
        return Ok(expand_path(&path));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("postsync").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostSyncError;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
[api]
base_url = "https://social.example/api"
timeout = "2s"

[events]
capacity = 8
"#,
        );

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://social.example/api");
        assert_eq!(config.api.request_timeout().unwrap(), Duration::from_secs(2));
        assert_eq!(config.events.capacity, 8);
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let file = write_config("[api]\nbase_url = \"http://localhost:3000/api\"\n");

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.api.timeout, "10s");
        assert_eq!(config.events.capacity, DEFAULT_EVENT_CAPACITY);
    }

    #[test]
    fn test_missing_api_section_is_parse_error() {
        let file = write_config("[events]\ncapacity = 4\n");
        let result = Config::load_from_path(file.path());
        assert!(matches!(
            result,
            Err(PostSyncError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let file = write_config("[api]\nbase_url = \"http://x\"\ntimeout = \"0s\"\n");
        let result = Config::load_from_path(file.path());
        assert!(matches!(
            result,
            Err(PostSyncError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(PostSyncError::Config(ConfigError::MissingField(_)))
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = Config::default();
        config.events.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Config::load_from_path(Path::new("/nonexistent/postsync/config.toml"));
        assert!(matches!(
            result,
            Err(PostSyncError::Config(ConfigError::ReadError(_)))
        ));
    }

    #[test]
    #[serial]
    fn test_load_uses_env_path_and_override() {
        let file = write_config("[api]\nbase_url = \"http://from-file/api\"\n");
        std::env::set_var("POSTSYNC_CONFIG", file.path());
        std::env::set_var("POSTSYNC_API_URL", "http://from-env/api");

        let result = Config::load();

        std::env::remove_var("POSTSYNC_CONFIG");
        std::env::remove_var("POSTSYNC_API_URL");

        assert_eq!(result.unwrap().api.base_url, "http://from-env/api");
    }

    #[test]
    #[serial]
    fn test_explicit_missing_path_is_error() {
        std::env::set_var("POSTSYNC_CONFIG", "/nonexistent/postsync.toml");
        let result = Config::load();
        std::env::remove_var("POSTSYNC_CONFIG");

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_expands_tilde() {
        std::env::set_var("POSTSYNC_CONFIG", "~/postsync.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("POSTSYNC_CONFIG");

        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("postsync.toml"));
    }

    #[test]
    #[serial]
    fn test_resolve_explicit_path_wins_over_env() {
        let file = write_config("[api]\nbase_url = \"http://explicit/api\"\n");
        std::env::set_var("POSTSYNC_CONFIG", "/nonexistent/postsync.toml");
        std::env::remove_var("POSTSYNC_API_URL");

        let result = Config::resolve(Some(&file.path().to_string_lossy()));
        std::env::remove_var("POSTSYNC_CONFIG");

        assert_eq!(result.unwrap().api.base_url, "http://explicit/api");
    }

    #[test]
    #[serial]
    fn test_resolve_defers_validation() {
        let file = write_config("[api]\nbase_url = \"\"\n");
        std::env::remove_var("POSTSYNC_API_URL");

        let mut config = Config::resolve(Some(&file.path().to_string_lossy())).unwrap();
        assert!(config.validate().is_err());

        config.api.base_url = "http://override/api".to_string();
        assert!(config.validate().is_ok());
        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_expand_path_tilde() {
        let path = expand_path("~/postsync/config.toml");
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("postsync/config.toml"));
        assert_eq!(expand_path("/etc/postsync.toml"), PathBuf::from("/etc/postsync.toml"));
    }
}
