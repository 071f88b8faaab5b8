use crate::calendar::Labels;
use crate::gesture::DEFAULT_SWIPE_THRESHOLD;
use crate::model::DEFAULT_MIN_YEAR;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lowest year the cursor may show.
    pub min_year: i32,
    /// Year shown at startup. Falls back to `min_year`.
    pub start_year: Option<i32>,
    /// Unlocks edit mode. Stored in plain text; it only guards against
    /// accidental edits.
    pub secret: String,
    /// Horizontal displacement, in pointer units, that counts as a swipe.
    pub swipe_threshold: f64,
    /// Pointer units per terminal column.
    pub cell_width: f64,
    pub confirm_millis: u64,
    pub labels: Labels,
    pub store: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_year: DEFAULT_MIN_YEAR,
            start_year: None,
            secret: "1234".into(),
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            cell_width: 8.0,
            confirm_millis: 1500,
            labels: Labels::default(),
            store: None,
        }
    }
}

impl Config {
    /// Loads `explicit` if given, else the per-user config file when present.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            return Config::from_path(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Config::from_path(&path),
            _ => Ok(Config::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Config> {
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config =
            serde_yaml::from_str(&data).with_context(|| format!("parsing config {:?}", path))?;
        Ok(config)
    }

    pub fn start_year(&self) -> i32 {
        self.start_year.unwrap_or(self.min_year).max(self.min_year)
    }

    pub fn confirm_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_millis)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "markcal").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget_behaviour() {
        let config = Config::default();
        assert_eq!(config.min_year, 2025);
        assert_eq!(config.start_year(), 2025);
        assert_eq!(config.swipe_threshold, 50.0);
        assert_eq!(config.confirm_interval(), Duration::from_millis(1500));
        assert_eq!(config.labels, Labels::Vi);
    }

    #[test]
    fn partial_yaml_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "secret: hunter2\nlabels: en\nstart_year: 2030\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.secret, "hunter2");
        assert_eq!(config.labels, Labels::En);
        assert_eq!(config.start_year(), 2030);
        assert_eq!(config.min_year, 2025);
        assert_eq!(config.confirm_millis, 1500);
    }

    #[test]
    fn start_year_below_minimum_is_clamped() {
        let config = Config {
            start_year: Some(1999),
            ..Config::default()
        };
        assert_eq!(config.start_year(), 2025);
    }

    #[test]
    fn invalid_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "min_year: [not, a, year]\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.yml"))).is_err());
    }
}
