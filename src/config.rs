//! Configuration management for the `Clima` service
//!
//! Location table and upstream request parameters are compiled in. The runtime
//! knobs here (timeouts, retry policy, timezone, port, logging) come from
//! environment variables prefixed with `CLIMA_`, nested with `__`.

use crate::ClimaError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use ::config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure for the `Clima` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClimaConfig {
    /// Upstream forecast feed configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream forecast feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// IANA zone requested from the feed and used for "current hour"
    #[serde(default = "default_weather_timezone")]
    pub timezone: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures; zero means a single attempt
    #[serde(default)]
    pub max_retries: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_server_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timezone: default_weather_timezone(),
            timeout_seconds: default_weather_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    /// Parsed IANA timezone
    pub fn tz(&self) -> Result<Tz, ClimaError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ClimaError::config(format!("Unknown timezone '{}'", self.timezone)))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl ClimaConfig {
    /// Load configuration from `CLIMA_*` environment variables
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                Environment::with_prefix("CLIMA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: ClimaConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<(), ClimaError> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<(), ClimaError> {
        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 120 {
            return Err(ClimaError::config(
                "Forecast request timeout must be between 1 and 120 seconds",
            ));
        }

        if self.weather.max_retries > 5 {
            return Err(ClimaError::config("Forecast max retries cannot exceed 5"));
        }

        if self.server.port == 0 {
            return Err(ClimaError::config("Server port cannot be 0"));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<(), ClimaError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ClimaError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "compact"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ClimaError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(ClimaError::config(
                "Forecast base URL must be a valid HTTP or HTTPS URL",
            ));
        }

        self.weather.tz()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClimaConfig::default();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.timezone, "America/Sao_Paulo");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.weather.max_retries, 0);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_timezone_parses() {
        let config = ClimaConfig::default();
        assert_eq!(config.weather.tz().unwrap(), chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn test_config_validation_invalid_timezone() {
        let mut config = ClimaConfig::default();
        config.weather.timezone = "Mars/Olympus_Mons".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Unknown timezone"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ClimaConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = ClimaConfig::default();
        config.weather.timeout_seconds = 500;
        assert!(config.validate().is_err());

        config.weather.timeout_seconds = 10;
        config.weather.max_retries = 9;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("max retries"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = ClimaConfig::default();
        config.weather.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: ClimaConfig =
            serde_json::from_str(r#"{"weather": {"max_retries": 2}}"#).unwrap();
        assert_eq!(config.weather.max_retries, 2);
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.server.port, 8080);
    }
}
