//! `crew.toml`: where role templates and souls live, and how to log.
//!
//! Later sources win: built-in defaults, then the TOML file (explicit
//! `--config`, else the first of `./filmeto-crew.toml`,
//! `<config_dir>/filmeto/crew.toml`, `~/.filmeto/crew.toml`), then
//! `FILMETO_*` variables, then command-line flags applied by the binary.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Everything `filmeto-crew` reads from `crew.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewConfig {
    /// Role templates and display settings
    pub crew: CrewSettings,

    /// Soul directories
    pub souls: SoulSettings,

    /// Tracing output
    pub logging: LoggingSettings,
}

/// Crew resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewSettings {
    /// Directory of role templates (`*.md`, optional `<language>/` subdirectories)
    pub system_dir: String,

    /// UI language, e.g. `en_US` or `zh_CN`
    pub language: String,

    /// Importance ranking used by `list`
    pub importance: ImportanceMode,
}

/// Soul directories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoulSettings {
    /// Souls shipped with the application
    pub system_dir: String,

    /// User-defined souls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_dir: Option<String>,
}

/// `[logging]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter level when no `-v`/`-q` flag is given
    pub level: String,

    /// Rolling log file; stderr only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Size hint for rotation; below 10 MB the file rotates hourly
    pub max_file_size_mb: u64,

    /// Rotated files kept on disk
    pub max_files: u32,

    /// Emit JSON lines instead of compact text
    pub json_format: bool,
}

/// Which ranking orders crew members for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportanceMode {
    /// Nine canonical roles
    #[default]
    Static,
    /// Discovery order of the language's role templates
    Dynamic,
}

impl FromStr for ImportanceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(ImportanceMode::Static),
            "dynamic" => Ok(ImportanceMode::Dynamic),
            other => Err(Error::config_field_invalid(
                "crew.importance",
                format!("Invalid importance mode '{other}'. Must be one of: static, dynamic"),
            )),
        }
    }
}

impl fmt::Display for ImportanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportanceMode::Static => f.write_str("static"),
            ImportanceMode::Dynamic => f.write_str("dynamic"),
        }
    }
}

impl Default for CrewSettings {
    fn default() -> Self {
        Self {
            system_dir: "~/.filmeto/agent/crew/system".to_string(),
            language: "en_US".to_string(),
            importance: ImportanceMode::Static,
        }
    }
}

impl Default for SoulSettings {
    fn default() -> Self {
        Self {
            system_dir: "~/.filmeto/agent/soul/system".to_string(),
            user_dir: Some("~/.filmeto/workspace/agent/souls".to_string()),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl CrewConfig {
    /// Resolve the effective configuration: file, then environment, then
    /// `~` expansion and validation.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match Self::locate(config_path)? {
            Some(path) => {
                let config = Self::from_file(&path)?;
                info!(path = %path.display(), "Using crew configuration");
                config
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    /// Parse a single TOML file without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = fs::read_to_string(path).map_err(|e| Error::io_read(path, e))?;
        toml::from_str(&content).map_err(|e| {
            Error::config_parse(format!("Failed to parse {}", path.display()), Some(e))
        })
    }

    /// An explicit path must exist; otherwise the first well-known file wins.
    fn locate(explicit: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(raw) = explicit {
            let path = PathBuf::from(expand_path(raw));
            if !path.exists() {
                return Err(Error::config_not_found(path));
            }
            return Ok(Some(path));
        }

        let found = [
            Some(PathBuf::from("filmeto-crew.toml")),
            dirs::config_dir().map(|dir| dir.join("filmeto").join("crew.toml")),
            dirs::home_dir().map(|home| home.join(".filmeto").join("crew.toml")),
        ]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.exists());

        match &found {
            Some(path) => debug!(path = %path.display(), "Found crew configuration"),
            None => debug!("No crew configuration file, using built-in defaults"),
        }
        Ok(found)
    }

    /// `FILMETO_*` variables replace file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FILMETO_CREW_SYSTEM_DIR") {
            self.crew.system_dir = val;
        }
        if let Ok(val) = std::env::var("FILMETO_LANGUAGE") {
            self.crew.language = val;
        }
        if let Ok(val) = std::env::var("FILMETO_IMPORTANCE") {
            match val.parse() {
                Ok(mode) => self.crew.importance = mode,
                Err(e) => warn!(value = %val, error = %e, "Ignoring FILMETO_IMPORTANCE"),
            }
        }

        if let Ok(val) = std::env::var("FILMETO_SOUL_SYSTEM_DIR") {
            self.souls.system_dir = val;
        }
        if let Ok(val) = std::env::var("FILMETO_SOUL_USER_DIR") {
            self.souls.user_dir = Some(val);
        }

        if let Ok(level) = std::env::var("FILMETO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(file) = std::env::var("FILMETO_LOG_FILE") {
            self.logging.file = Some(file);
        }
        if let Ok(flag) = std::env::var("FILMETO_LOG_JSON") {
            self.logging.json_format = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Resolve `~` and `$VAR` in every path setting
    pub fn expand_paths(&mut self) {
        self.crew.system_dir = expand_path(&self.crew.system_dir);
        self.souls.system_dir = expand_path(&self.souls.system_dir);
        for slot in [&mut self.souls.user_dir, &mut self.logging.file] {
            if let Some(value) = slot.as_mut() {
                *value = expand_path(value);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.crew.system_dir.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "crew.system_dir",
                "Role template directory cannot be empty",
            ));
        }

        if self.crew.language.trim().is_empty() {
            return Err(Error::config_field_invalid("crew.language", "Language cannot be empty"));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        let level = self.logging.level.trim().to_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!("Unknown log level '{}' (expected {})", self.logging.level, LEVELS.join("|")),
            ));
        }

        Ok(())
    }

    /// Role template directory
    pub fn crew_system_dir(&self) -> PathBuf {
        PathBuf::from(&self.crew.system_dir)
    }

    /// System soul directory
    pub fn soul_system_dir(&self) -> PathBuf {
        PathBuf::from(&self.souls.system_dir)
    }

    /// User soul directory, if configured
    pub fn soul_user_dir(&self) -> Option<PathBuf> {
        self.souls
            .user_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
    }
}

/// `~` and `$VAR` expansion; unresolvable variables leave the path as written
fn expand_path(path: &str) -> String {
    match shellexpand::full(path) {
        Ok(expanded) => expanded.into_owned(),
        Err(_) => path.to_string(),
    }
}

/// Default location for `config init`
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".filmeto").join("crew.toml")
}

/// `config init`: write the commented template, returning its path
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(raw) => PathBuf::from(expand_path(raw)),
        None => default_config_path(),
    };

    if !force && config_path.exists() {
        return Err(Error::Config(format!(
            "{} already exists (pass --force to replace it)",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io_write(parent, e))?;
    }

    fs::write(&config_path, generate_default_config())
        .map_err(|e| Error::io_write(&config_path, e))?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Commented `crew.toml` mirroring the built-in defaults
pub fn generate_default_config() -> String {
    r#"# Filmeto Crew Configuration

[crew]
# Directory of role templates, one Markdown file per role.
# Language subdirectories (en_US/, zh_CN/) are used for titles only.
system_dir = "~/.filmeto/agent/crew/system"

# UI language for display names
language = "en_US"

# Importance ranking: static (canonical roles) or dynamic (template order)
importance = "static"

[souls]
# Souls shipped with the application
system_dir = "~/.filmeto/agent/soul/system"

# User-defined souls
user_dir = "~/.filmeto/workspace/agent/souls"

[logging]
# trace | debug | info | warn | error (-v / -q override this)
level = "info"

# Rolling log file; stderr only when absent
# file = "~/.filmeto/logs/crew.log"

# Below 10 the file rotates hourly, otherwise daily
max_file_size_mb = 100

# Rotated files to keep
max_files = 5

# JSON lines instead of compact text
json_format = false
"#
    .to_string()
}
