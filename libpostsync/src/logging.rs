//! Logging setup shared by the library and the postsync binary
//!
//! Output always goes to stderr so that stdout stays reserved for store
//! snapshots. Three formats are available:
//! - Text: compact lines for terminals and pipes
//! - Json: one object per line for log collectors
//! - Pretty: multi-line with source locations, for development
//!
//! `RUST_LOG` wins over the configured level when set.
//!
//! # Examples
//!
//! ```no_run
//! use libpostsync::logging::{LoggingConfig, LogFormat};
//!
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//!
//! // Or read POSTSYNC_LOG_FORMAT / POSTSYNC_LOG_LEVEL
//! libpostsync::logging::init_default();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    /// Raises this crate's own events to debug regardless of `level`
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read `POSTSYNC_LOG_FORMAT` and `POSTSYNC_LOG_LEVEL`
    ///
    /// Unknown formats fall back to text; a missing level means "warn".
    pub fn from_env() -> Self {
        let format = std::env::var("POSTSYNC_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);

        let level = std::env::var("POSTSYNC_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Self::new(format, level, false)
    }

    /// Filter directives this configuration resolves to, ignoring `RUST_LOG`
    pub fn directives(&self) -> String {
        if self.verbose {
            format!("{},libpostsync=debug,postsync=debug", self.level)
        } else {
            self.level.clone()
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }

    /// Install the global subscriber
    ///
    /// Returns an error instead of panicking when a subscriber is already
    /// installed.
    pub fn try_init(&self) -> Result<(), String> {
        let filter = self.filter();

        let result = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_line_number(true)
                .with_file(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
        };

        result.map_err(|e| e.to_string())
    }

    /// Install the global subscriber, ignoring a second initialization
    pub fn init(&self) {
        // Already-initialized is the only failure; the first subscriber stays
        let _ = self.try_init();
    }
}

/// Initialize logging from environment variables
pub fn init_default() {
    LoggingConfig::from_env().init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" PRETTY ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_from_str_invalid() {
        let result = "yaml".parse::<LogFormat>();
        assert!(result.unwrap_err().contains("Invalid log format: 'yaml'"));
    }

    #[test]
    fn test_log_format_display_round_trips() {
        for format in [LogFormat::Text, LogFormat::Json, LogFormat::Pretty] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_directives_verbose() {
        let config = LoggingConfig::new(LogFormat::Text, "warn".to_string(), true);
        assert_eq!(config.directives(), "warn,libpostsync=debug,postsync=debug");

        let quiet = LoggingConfig::new(LogFormat::Text, "error".to_string(), false);
        assert_eq!(quiet.directives(), "error");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("POSTSYNC_LOG_FORMAT", "json");
        std::env::set_var("POSTSYNC_LOG_LEVEL", "debug");
        let config = LoggingConfig::from_env();
        std::env::remove_var("POSTSYNC_LOG_FORMAT");
        std::env::remove_var("POSTSYNC_LOG_LEVEL");

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "debug");
        assert!(!config.verbose);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::remove_var("POSTSYNC_LOG_FORMAT");
        std::env::remove_var("POSTSYNC_LOG_LEVEL");
        let config = LoggingConfig::from_env();

        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn test_second_init_does_not_panic() {
        let config = LoggingConfig::new(LogFormat::Text, "off".to_string(), false);
        config.init();
        config.init();
    }
}
