//! Configuration loading and root folder resolution
//!
//! The embedded default config is overlaid by an optional user TOML file.
//! Paths of the index files all live under the root folder.

use crate::sources::{AudioSource, SourceDescriptor, SourceKind};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "LOCAL_AUDIO_CONFIG";
/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "LOCAL_AUDIO_ROOT_FOLDER";

const APP_DIR_NAME: &str = "local-audio";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

const USER_FILES_DIR: &str = "user_files";
const ENTRIES_DB_FILE: &str = "entries.db";
const BUILDING_DB_FILE: &str = "entries.db.building";
const VERSION_MARKER_FILE: &str = "db_version.txt";
const VARIANT_FORMS_FILE: &str = "jmdict_forms.json";

/// Complete application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Root folder for index and corpus files (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Corpora in default priority order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// One `[[sources]]` table
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub id: String,
    pub path: PathBuf,
    pub display: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5050
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load the default config overlaid by the user config file, if any
    ///
    /// An explicitly named file (argument or `LOCAL_AUDIO_CONFIG`) must
    /// exist; the per-user default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match locate_config_file(explicit)? {
            Some(path) => {
                info!("Loading config from {}", path.display());
                let text = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
                })?;
                Self::from_user_toml(Some(&text))
            }
            None => {
                debug!("No user config file, using defaults");
                Self::from_user_toml(None)
            }
        }
    }

    /// Build the config from the defaults and optional user TOML text
    pub fn from_user_toml(user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULT_CONFIG)
            .map_err(|e| Error::Config(format!("Invalid default config: {}", e)))?;

        if let Some(user) = user {
            let user: toml::Table = toml::from_str(user)
                .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
            merged.extend(user);
        }

        let config: AppConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e| Error::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for source in &self.sources {
            if source.id.is_empty() {
                return Err(Error::Config("Source id must not be empty".to_string()));
            }
            if !ids.insert(source.id.as_str()) {
                return Err(Error::Config(format!("Duplicate source id: {}", source.id)));
            }
        }
        Ok(())
    }

    /// Configured sources with media roots resolved against the root folder
    pub fn audio_sources(&self, root_folder: &Path) -> Vec<AudioSource> {
        self.sources
            .iter()
            .map(|source| {
                AudioSource::new(
                    source.kind,
                    SourceDescriptor {
                        id: source.id.clone(),
                        media_dir: root_folder.join(&source.path),
                        display: source.display.clone(),
                    },
                )
            })
            .collect()
    }
}

fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    if let Some(path) = named {
        if !path.is_file() {
            return Err(Error::Config(format!("Config file not found: {}", path.display())));
        }
        return Ok(Some(path));
    }

    Ok(default_config_path().filter(|path| path.is_file()))
}

/// Per-user config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Config file `root_folder`
/// 4. OS-dependent default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &AppConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = std::env::var_os(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./local_audio_data"))
}

/// Locations of index files under a root folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root_folder: PathBuf,
}

impl DataPaths {
    pub fn new(root_folder: impl Into<PathBuf>) -> Self {
        Self {
            root_folder: root_folder.into(),
        }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn user_files(&self) -> PathBuf {
        self.root_folder.join(USER_FILES_DIR)
    }

    /// The live index database
    pub fn entries_db(&self) -> PathBuf {
        self.user_files().join(ENTRIES_DB_FILE)
    }

    /// Scratch database a rebuild writes before replacing the live one
    pub fn building_db(&self) -> PathBuf {
        self.user_files().join(BUILDING_DB_FILE)
    }

    pub fn version_marker(&self) -> PathBuf {
        self.user_files().join(VERSION_MARKER_FILE)
    }

    /// Variant groups used by the backfill
    pub fn variant_forms(&self) -> PathBuf {
        self.user_files().join(VARIANT_FORMS_FILE)
    }
}
