use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// WebSocket endpoint of the platform bus
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Base URL for static platform resources (documents, terms)
    #[serde(default = "default_resource_base_url")]
    pub resource_base_url: String,
    /// Environment variable holding the session token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_ws_url() -> String {
    "wss://bus.arcus.example/websocket".to_string()
}

fn default_resource_base_url() -> String {
    "https://static.arcus.example".to_string()
}

fn default_token_env() -> String {
    "ARCUS_TOKEN".to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            resource_base_url: default_resource_base_url(),
            token_env: default_token_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate_ms: u64,
}

fn default_refresh_rate() -> u64 {
    250
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// State directory override; defaults to the platform data dir
    #[serde(default)]
    pub state: Option<String>,
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the console works without
        // config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // User config in ~/.config/arcus-console/
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("arcus-console").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with ARCUS_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("ARCUS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Path of the user config file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("arcus-console").join("config.toml"))
    }

    /// Save the configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::user_config_path()
            .context("no config directory on this platform")?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(&config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// The session token, read from the configured environment variable
    pub fn token(&self) -> Result<String> {
        std::env::var(&self.platform.token_env).with_context(|| {
            format!(
                "no session token: set {} in the environment",
                self.platform.token_env
            )
        })
    }

    /// State directory (wizard progress, preferences, logs)
    pub fn state_path(&self) -> PathBuf {
        match &self.paths.state {
            Some(path) => PathBuf::from(path),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("arcus-console"),
        }
    }

    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.state_path().join("preferences.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: PlatformConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_path_override() {
        let mut config = Config::default();
        config.paths.state = Some("/tmp/arcus-test".to_string());
        assert_eq!(config.state_path(), PathBuf::from("/tmp/arcus-test"));
        assert_eq!(config.logs_path(), PathBuf::from("/tmp/arcus-test/logs"));
    }

    #[test]
    fn test_defaults_are_complete() {
        let config = Config::default();
        assert!(config.platform.ws_url.starts_with("wss://"));
        assert_eq!(config.platform.token_env, "ARCUS_TOKEN");
        assert_eq!(config.ui.refresh_rate_ms, 250);
        assert_eq!(config.logging.level, "info");
    }
}
