use crate::model::StatusFilter;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Days shown on each side of the selected day.
pub const DEFAULT_WINDOW_RADIUS: i64 = 15;
/// Upper bound on the radius; larger values are clamped.
pub const MAX_WINDOW_RADIUS: i64 = 366;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub window_radius: i64,
    pub default_filter: StatusFilter,
    pub tasks_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window_radius: DEFAULT_WINDOW_RADIUS,
            default_filter: StatusFilter::All,
            tasks_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config> {
        match config_path() {
            Some(path) => Config::load_from(&path),
            None => {
                log::warn!("no config directory available, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            log::debug!("no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let config: Config = serde_yaml::from_str(&data)
            .with_context(|| format!("parsing config file {:?}", path))?;
        log::debug!("loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Applies command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        radius: Option<i64>,
        filter: Option<StatusFilter>,
        tasks_file: Option<PathBuf>,
    ) -> Config {
        if let Some(r) = radius {
            self.window_radius = r;
        }
        if let Some(f) = filter {
            self.default_filter = f;
        }
        if tasks_file.is_some() {
            self.tasks_file = tasks_file;
        }
        if self.window_radius > MAX_WINDOW_RADIUS {
            log::warn!(
                "window radius {} clamped to {}",
                self.window_radius,
                MAX_WINDOW_RADIUS
            );
            self.window_radius = MAX_WINDOW_RADIUS;
        }
        self
    }
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taskday").map(|dirs| dirs.config_dir().join("config.yml"))
}
