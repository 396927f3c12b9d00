// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::resolver::{DEFAULT_WILDCARD_CLASS, OverrideMatch, ResolutionRules};
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use chrono::Weekday;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

fn default_wildcard_class() -> String {
    DEFAULT_WILDCARD_CLASS.to_string()
}

fn default_week_start() -> Weekday {
    Weekday::Mon
}

fn default_grid_first_hour() -> u32 {
    8
}
fn default_grid_last_hour() -> u32 {
    20
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Class marker that matches every class filter ("All").
    #[serde(default = "default_wildcard_class")]
    pub wildcard_class: String,
    #[serde(default)]
    pub override_match: OverrideMatch,
    #[serde(default = "default_week_start")]
    pub week_starts_on: Weekday,

    // Occupancy grid covers [first, last) hours.
    #[serde(default = "default_grid_first_hour")]
    pub grid_first_hour: u32,
    #[serde(default = "default_grid_last_hour")]
    pub grid_last_hour: u32,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wildcard_class: default_wildcard_class(),
            override_match: OverrideMatch::default(),
            week_starts_on: default_week_start(),
            grid_first_hour: default_grid_first_hour(),
            grid_last_hour: default_grid_last_hour(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    /// A file that exists and fails to parse is still an error.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(cfg) => Ok(cfg),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Whether an error returned by [`load`](Self::load) means "no config file".
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
        })
    }

    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn resolution_rules(&self) -> ResolutionRules {
        let wildcard = self.wildcard_class.trim();
        ResolutionRules {
            wildcard_class: if wildcard.is_empty() {
                default_wildcard_class()
            } else {
                wildcard.to_string()
            },
            override_match: self.override_match,
        }
    }

    /// Unknown level names fall back to `Warn`.
    pub fn log_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(self.log_level.trim()).unwrap_or(LevelFilter::Warn)
    }

    /// Grid hours clamped to a valid, non-empty range within one day.
    pub fn grid_hours(&self) -> (u32, u32) {
        let first = self.grid_first_hour.min(23);
        let last = self.grid_last_hour.clamp(first + 1, 24);
        if (first, last) != (self.grid_first_hour, self.grid_last_hour) {
            log::warn!(
                "grid hours {}..{} out of range, using {}..{}",
                self.grid_first_hour,
                self.grid_last_hour,
                first,
                last
            );
        }
        (first, last)
    }
}
