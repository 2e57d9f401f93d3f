use crate::error::Result;
use crate::export::OutputFormat;
use crate::stats::{GcWindow, PileupOptions};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "default_window_size")]
    pub window_size: i64,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_max_depth() -> u32 {
    PileupOptions::default().max_depth
}

fn default_window_size() -> i64 {
    GcWindow::DEFAULT_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            window_size: default_window_size(),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("com", "pileupstats", "pileup-stats")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The user's config file, or defaults when there is none or it cannot
    /// be parsed.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                debug!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("ignoring {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(anyhow::Error::from)?;
        fs::write(path, content)?;
        Ok(())
    }
}
