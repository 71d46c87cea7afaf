//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `MUSHAF_ROOT_FOLDER` environment variable
//! 3. `MUSHAF_ROOT` environment variable
//! 4. TOML config file (`root_folder` key)
//! 5. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts startup: the resolver logs a
//! warning and continues with defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary root folder environment variable
pub const ROOT_FOLDER_ENV: &str = "MUSHAF_ROOT_FOLDER";
/// Alternative root folder environment variable
pub const ROOT_ENV: &str = "MUSHAF_ROOT";
/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "mushaf.db";

/// Compiled-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("mushaf"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\mushaf"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("mushaf"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/mushaf"))
        } else {
            // ~/.local/share/mushaf (or /var/lib/mushaf for system-wide)
            dirs::data_local_dir()
                .map(|d| d.join("mushaf"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/mushaf"))
        };

        Self {
            root_folder,
            log_level: "info".to_string(),
        }
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
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

fn default_log_level() -> String {
    "info".to_string()
}

/// `[alignment]` section: forced-alignment service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignmentSection {
    pub api_url: Option<String>,
    pub secret_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub language: Option<String>,
}

/// `[media]` section: audio file URL resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaSection {
    pub public_base_url: Option<String>,
}

/// `[server]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
}

/// Module TOML configuration file contents
///
/// Every section is optional so that a partial file still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub alignment: AlignmentSection,
    #[serde(default)]
    pub media: MediaSection,
    #[serde(default)]
    pub server: ServerSection,
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Resolves the root folder and loads the module's TOML file
pub struct RootFolderResolver {
    module_name: String,
    cli_override: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_override: None,
        }
    }

    /// Command-line argument, highest priority when present
    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    /// Path of the module TOML file (`<config dir>/mushaf/<module>.toml`)
    pub fn config_file_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mushaf").join(format!("{}.toml", self.module_name)))
    }

    /// Load the module TOML file, falling back to defaults when absent or invalid
    pub fn load_config(&self) -> TomlConfig {
        let Some(path) = self.config_file_path() else {
            warn!("Could not determine config directory, using defaults");
            return TomlConfig::default();
        };

        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return TomlConfig::default();
        }

        match load_toml_config(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }

    /// Resolve the root folder following the priority order
    pub fn resolve(&self) -> PathBuf {
        self.resolve_with(&self.load_config())
    }

    /// Resolve the root folder against an already-loaded TOML config
    pub fn resolve_with(&self, config: &TomlConfig) -> PathBuf {
        if let Some(path) = &self.cli_override {
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(path) = &config.root_folder {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder on disk
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }

    /// Create the root folder if missing (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }
}
