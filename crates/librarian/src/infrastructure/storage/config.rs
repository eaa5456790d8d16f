//! TOML-based configuration for the librarian.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\SteamRomLibrarian\config.toml`
//! - Linux:    `~/.config/steam-rom-librarian/config.toml`
//! - macOS:    `~/Library/Application Support/SteamRomLibrarian/config.toml`
//!
//! A `--config` path on the command line replaces the platform location.
//!
//! # Example
//!
//! ```toml
//! [general]
//! log_level = "debug"
//! library_path = "/home/deck/roms/library.json"
//!
//! [steam]
//! steam_path = "/home/deck/.local/share/Steam"
//! user_id = "12345678"
//!
//! [store]
//! backup = true
//! backup_extension = "bak"
//! install_artwork = true
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so an empty
//! file (or no file at all) is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub steam: SteamConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// General behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Catalogue library file.  Defaults to `library.json` next to the config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,
}

/// Where Steam lives and which user's shortcuts to manage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SteamConfig {
    /// Steam root directory; detected when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_path: Option<PathBuf>,
    /// Numeric Steam user ID (the `userdata` directory name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// How the shortcut store is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Keep a copy of the previous store before replacing it.
    #[serde(default = "default_true")]
    pub backup: bool,
    #[serde(default = "default_backup_extension")]
    pub backup_extension: String,
    /// Copy catalogue artwork into Steam's grid directory after writing.
    #[serde(default = "default_true")]
    pub install_artwork: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_backup_extension() -> String {
    "bak".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            library_path: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backup: default_true(),
            backup_extension: default_backup_extension(),
            install_artwork: default_true(),
        }
    }
}

impl StoreConfig {
    /// The backup extension, or `None` when backups are disabled.
    pub fn backup_extension(&self) -> Option<String> {
        self.backup.then(|| self.backup_extension.clone())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`.
///
/// Creates the parent directory if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Writes `AppConfig::default()` to `path` unless a file is already there.
///
/// Returns `true` if the file was written.
///
/// # Errors
///
/// Returns [`ConfigError`] if the default config cannot be written.
pub fn write_default_config(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    save_config(path, &AppConfig::default())?;
    Ok(true)
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SteamRomLibrarian"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("steam-rom-librarian"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SteamRomLibrarian")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
