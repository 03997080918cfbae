//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a single TOML file. Every field has a
//! built-in default, so a missing file is not an error: the service logs a
//! warning and starts with defaults.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--config`, `--port`)
//! 2. Environment variables (`DECKHAND_CONFIG`, `DECKHAND_PORT`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DECKHAND_CONFIG";

/// Default HTTP port for deckhand-session
pub const DEFAULT_PORT: u16 = 5750;

/// Default position poll interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;

/// How commands that reference a track with no loaded handle are reported
///
/// `play` always reports a missing track. `Lenient` keeps `pause` and
/// `unload` silent when nothing matches; `Strict` reports them too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTrackPolicy {
    #[default]
    Lenient,
    Strict,
}

/// Session manager settings (`[session]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Position poller interval in milliseconds
    pub poll_interval_ms: u64,

    /// Reporting policy for pause/unload of unknown tracks
    pub missing_track_policy: MissingTrackPolicy,

    /// EventBus channel capacity
    pub event_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            missing_track_policy: MissingTrackPolicy::default(),
            event_capacity: 256,
        }
    }
}

impl SessionSettings {
    /// Poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config(
                "session.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config(
                "session.event_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration (`[logging]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: u16,

    /// Session manager settings
    pub session: SessionSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            session: SessionSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.session.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// A missing file yields the built-in defaults (with a warning).
    /// An unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Resolve which config file to read
///
/// Priority: command-line argument, then `DECKHAND_CONFIG`, then the
/// platform config directory (`~/.config/deckhand/config.toml` on Linux).
/// Returns None only when no candidate can be determined at all.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path()
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("deckhand").join("config.toml"))
}

/// Resolve and load configuration, falling back to defaults
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => TomlConfig::load(&path),
        None => {
            warn!("Could not determine config directory, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}
