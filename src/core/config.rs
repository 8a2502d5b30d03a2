//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = ".wirekit.yaml";

const DEFAULT_LENGTH_UNIT: &str = "m";
const DEFAULT_GAUGE_UNIT: &str = "mm²";

/// wirekit configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format for `wirekit bom`
    pub default_format: Option<String>,

    /// Unit assumed for cable lengths given as bare numbers
    pub length_unit: Option<String>,

    /// Unit assumed for gauges given as bare numbers
    pub gauge_unit: Option<String>,
}

/// Defaults applied while building a harness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub length_unit: String,
    pub gauge_unit: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            length_unit: DEFAULT_LENGTH_UNIT.to_string(),
            gauge_unit: DEFAULT_GAUGE_UNIT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let local = std::env::current_dir()
            .ok()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE));
        Self::load_from(
            Self::global_config_path().as_deref(),
            local.as_deref(),
            |key| std::env::var(key).ok(),
        )
    }

    /// Layered load with explicit file locations and environment lookup
    pub fn load_from(
        global: Option<&Path>,
        local: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/wirekit/config.yaml)
        // 3. Working directory config (.wirekit.yaml)
        for path in [global, local].into_iter().flatten() {
            if let Some(layer) = Self::read_file(path) {
                config.merge(layer);
            }
        }

        // 4. Environment variables
        if let Some(format) = env("WIREKIT_FORMAT") {
            config.default_format = Some(format);
        }
        if let Some(unit) = env("WIREKIT_LENGTH_UNIT") {
            config.length_unit = Some(unit);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("ignoring config file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "wirekit")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.length_unit.is_some() {
            self.length_unit = other.length_unit;
        }
        if other.gauge_unit.is_some() {
            self.gauge_unit = other.gauge_unit;
        }
    }

    /// Harness build defaults derived from this config
    pub fn build_options(&self) -> BuildOptions {
        let defaults = BuildOptions::default();
        BuildOptions {
            length_unit: self.length_unit.clone().unwrap_or(defaults.length_unit),
            gauge_unit: self.gauge_unit.clone().unwrap_or(defaults.gauge_unit),
        }
    }
}
