//! # Configuration
//!
//! Centralizes the engine's timings and display settings with a clear
//! override hierarchy: defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.conmenu/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! Library users who never touch a file just use `Settings::default()`.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MenuConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimingConfig {
    pub poll_interval_ms: Option<u64>,
    pub debounce_ms: Option<u64>,
    pub loading_grace_ms: Option<u64>,
    pub animation_tick_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Rows kept free for the title, description and prompt.
    pub reserved_rows: Option<u16>,
    /// Lower bound on the number of items per page.
    pub min_options: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_DEBOUNCE_MS: u64 = 20;
pub const DEFAULT_LOADING_GRACE_MS: u64 = 100;
pub const DEFAULT_ANIMATION_TICK_MS: u64 = 10;
pub const DEFAULT_RESERVED_ROWS: u16 = 8;
pub const DEFAULT_MIN_OPTIONS: usize = 3;
pub const DEFAULT_LOG_FILE: &str = "conmenu.log";

// ============================================================================
// Resolved Settings (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Sleep between key polls while no key is pending.
    pub poll_interval: Duration,
    /// Window in which a second key marks the first as accidental.
    pub debounce: Duration,
    /// How long a page load may take before the loading indicator appears.
    pub loading_grace: Duration,
    /// Repaint interval of the indeterminate progress animation.
    pub animation_tick: Duration,
    pub reserved_rows: u16,
    pub min_options: usize,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        resolve(&MenuConfig::default(), &CliOverrides::default())
    }
}

/// Values taken from command-line flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.conmenu/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".conmenu").join("config.toml"))
}

/// Load config from `~/.conmenu/config.toml`, or from `explicit` when given.
///
/// A missing default file is generated (commented out) and yields
/// `MenuConfig::default()`. A missing explicit file is an I/O error.
pub fn load_config(explicit: Option<&Path>) -> Result<MenuConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(MenuConfig::default());
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(MenuConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: MenuConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# conmenu configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [timing]
# poll_interval_ms = 100     # Sleep between key polls
# debounce_ms = 20           # A second key within this window discards both
# loading_grace_ms = 100     # Delay before the loading indicator appears
# animation_tick_ms = 10     # Indeterminate progress repaint interval

# [display]
# reserved_rows = 8          # Rows kept for title, description and prompt
# min_options = 3            # Minimum items per page on tiny terminals

# [logging]
# level = "debug"            # "off", "error", "warn", "info", "debug", "trace"
# file = "conmenu.log"       # Or set CONMENU_LOG_FILE
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final settings by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &MenuConfig, cli: &CliOverrides) -> Settings {
    let timing = &config.timing;

    // Log level: CLI → env → config → default
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("CONMENU_LOG_LEVEL").ok())
        .or_else(|| config.logging.level.clone())
        .and_then(|level| parse_level(&level))
        .unwrap_or(LevelFilter::Debug);

    // Log file: CLI → env → config → default
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| std::env::var("CONMENU_LOG_FILE").ok().map(PathBuf::from))
        .or_else(|| config.logging.file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    Settings {
        poll_interval: Duration::from_millis(
            timing.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        ),
        debounce: Duration::from_millis(timing.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)),
        loading_grace: Duration::from_millis(
            timing.loading_grace_ms.unwrap_or(DEFAULT_LOADING_GRACE_MS),
        ),
        animation_tick: Duration::from_millis(
            timing.animation_tick_ms.unwrap_or(DEFAULT_ANIMATION_TICK_MS),
        ),
        reserved_rows: config.display.reserved_rows.unwrap_or(DEFAULT_RESERVED_ROWS),
        min_options: config
            .display
            .min_options
            .unwrap_or(DEFAULT_MIN_OPTIONS)
            .max(1),
        log_level,
        log_file,
    }
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.parse::<LevelFilter>() {
        Ok(filter) => Some(filter),
        Err(_) => {
            warn!("Unknown log level '{}', keeping default", level);
            None
        }
    }
}
