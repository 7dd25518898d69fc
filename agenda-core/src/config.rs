//! Global agenda configuration.

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};

static DEFAULT_DATA_DIR: &str = "~/agenda";
pub const DEFAULT_SCHEDULES_FILE: &str = "schedules.txt";
pub const DEFAULT_PATTERNS_FILE: &str = "repeat_schedules.txt";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

fn default_schedules_file() -> String {
    DEFAULT_SCHEDULES_FILE.to_string()
}

fn is_default_schedules_file(name: &String) -> bool {
    name == DEFAULT_SCHEDULES_FILE
}

fn default_patterns_file() -> String {
    DEFAULT_PATTERNS_FILE.to_string()
}

fn is_default_patterns_file(name: &String) -> bool {
    name == DEFAULT_PATTERNS_FILE
}

/// Global configuration at ~/.config/agenda/config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AgendaConfig {
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(
        default = "default_schedules_file",
        skip_serializing_if = "is_default_schedules_file"
    )]
    pub schedules_file: String,

    #[serde(
        default = "default_patterns_file",
        skip_serializing_if = "is_default_patterns_file"
    )]
    pub patterns_file: String,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            data_dir: default_data_dir(),
            schedules_file: default_schedules_file(),
            patterns_file: default_patterns_file(),
        }
    }
}

impl AgendaConfig {
    pub fn config_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/agenda/config.toml, creating a commented default first
    /// if there is none.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    /// Save the current config to ~/.config/agenda/config.toml
    pub fn save(&self) -> AgendaResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AgendaResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| AgendaError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# Where schedules.txt and repeat_schedules.txt live:
# data_dir = \"{}\"

# File names inside data_dir:
# schedules_file = \"{}\"
# patterns_file = \"{}\"
",
            DEFAULT_DATA_DIR, DEFAULT_SCHEDULES_FILE, DEFAULT_PATTERNS_FILE
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn schedules_path(&self) -> PathBuf {
        self.data_path().join(&self.schedules_file)
    }

    pub fn patterns_path(&self) -> PathBuf {
        self.data_path().join(&self.patterns_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agenda/config.toml");

        AgendaConfig::create_default_config(&path).unwrap();
        let config = AgendaConfig::load_from(&path).unwrap();

        assert_eq!(config, AgendaConfig::default());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AgendaConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, AgendaConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AgendaConfig {
            data_dir: dir.path().join("data"),
            patterns_file: "weekly.txt".to_string(),
            ..AgendaConfig::default()
        };
        config.save_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("patterns_file"));
        assert!(!written.contains("schedules_file"));

        let reloaded = AgendaConfig::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.patterns_path(), dir.path().join("data/weekly.txt"));
        assert_eq!(reloaded.schedules_path(), dir.path().join("data/schedules.txt"));
    }

    #[test]
    fn test_data_path_expands_tilde() {
        let config = AgendaConfig::default();
        assert!(!config.data_path().to_string_lossy().starts_with('~'));
    }
}
