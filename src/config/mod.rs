//! Configuration module.
//!
//! Handles loading and parsing the `.extreloadrc` file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::controller::{
    ControllerSettings, DEFAULT_BULK_STATUS_CLEAR, DEFAULT_STATUS_CLEAR, DEFAULT_TAB_STATUS_CLEAR,
};
use crate::geometry::DEFAULT_MENU_MARGIN;
use crate::logging::{LogConfig, LogLevel};

/// Default popup width in cells.
pub const DEFAULT_POPUP_WIDTH: u16 = 56;

/// Default cap on the action menu width in cells.
pub const DEFAULT_MENU_MAX_WIDTH: u16 = 26;

/// Written to disk the first time the config is loaded.
const DEFAULT_EXTRELOADRC: &str = r#"# extreload configuration
# ========================
# Read on startup. Lines starting with '#' are comments.
#
# Status delays
# -------------
# Milliseconds a row shows "Updated" before clearing.
# status_clear_ms      = 1500   # Update from a row menu
# bulk_status_clear_ms = 1200   # Update all
# tab_status_clear_ms  = 1000   # Update from a tab entry

# Layout
# ------
# popup_width    = 56    # Popup width in cells
# menu_margin    = 1     # Gap between the action menu and the popup edges
# menu_max_width = 26    # Widest the action menu may grow

# Host
# ----
# host_latency_ms = 0    # Delay added to every simulated host call

# Logging
# -------
# Logs are stored in ~/.extreload/logs/ and old files are removed at startup.
#
# log_enabled   = true   # true/false
# log_level     = info   # trace, debug, info, warn, error, off
# log_retention = 24     # Hours to keep log files
"#;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub status_clear: Duration,
    pub bulk_status_clear: Duration,
    pub tab_status_clear: Duration,
    pub menu_margin: u16,
    pub menu_max_width: u16,
    pub popup_width: u16,
    /// Delay `LocalHost` adds to each call.
    pub host_latency: Duration,
    pub log_config: LogConfig,
    /// File this configuration came from.
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status_clear: DEFAULT_STATUS_CLEAR,
            bulk_status_clear: DEFAULT_BULK_STATUS_CLEAR,
            tab_status_clear: DEFAULT_TAB_STATUS_CLEAR,
            menu_margin: DEFAULT_MENU_MARGIN,
            menu_max_width: DEFAULT_MENU_MAX_WIDTH,
            popup_width: DEFAULT_POPUP_WIDTH,
            host_latency: Duration::ZERO,
            log_config: LogConfig::default(),
            config_path: Self::default_config_path(),
        }
    }
}

impl Config {
    /// Returns the default config file path (`~/.extreloadrc`).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".extreloadrc")
    }

    /// Loads configuration from the default path, creating it if missing.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or read.
    pub fn load() -> io::Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    /// Loads configuration from `path`, creating it if missing.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or read.
    pub fn load_from(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::parse(&content);
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Parses config text on top of the defaults. Unknown keys and bad
    /// values are skipped.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                // Strip inline comments
                let value = value.split('#').next().unwrap_or(value).trim();
                config.apply_setting(key.trim(), value);
            }
        }
        config
    }

    fn create_default_config(path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_EXTRELOADRC.as_bytes())?;
        Ok(())
    }

    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            "status_clear_ms" => set_millis(&mut self.status_clear, key, value),
            "bulk_status_clear_ms" => set_millis(&mut self.bulk_status_clear, key, value),
            "tab_status_clear_ms" => set_millis(&mut self.tab_status_clear, key, value),
            "host_latency_ms" => set_millis(&mut self.host_latency, key, value),
            "menu_margin" => set_cells(&mut self.menu_margin, key, value),
            "menu_max_width" => set_cells(&mut self.menu_max_width, key, value),
            "popup_width" => set_cells(&mut self.popup_width, key, value),
            "log_enabled" | "logging" => {
                self.log_config.enabled = parse_bool(value);
            }
            "log_level" => {
                self.log_config.level = LogLevel::parse(value);
            }
            "log_retention" | "log_retention_hours" => {
                self.log_config.retention_hours = LogConfig::parse_retention(value);
            }
            _ => warn!("[CONFIG] unknown setting '{}'", key),
        }
    }

    /// Controller timing and placement knobs.
    #[must_use]
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            status_clear: self.status_clear,
            bulk_status_clear: self.bulk_status_clear,
            tab_status_clear: self.tab_status_clear,
            menu_margin: self.menu_margin,
        }
    }

    /// Simulated host latency.
    #[must_use]
    pub fn host_latency(&self) -> Duration {
        self.host_latency
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1" | "on")
}

fn set_millis(slot: &mut Duration, key: &str, value: &str) {
    match value.parse::<u64>() {
        Ok(ms) => *slot = Duration::from_millis(ms),
        Err(_) => warn!("[CONFIG] '{}' is not a millisecond count: {}", key, value),
    }
}

fn set_cells(slot: &mut u16, key: &str, value: &str) {
    match value.parse::<u16>() {
        Ok(cells) => *slot = cells,
        Err(_) => warn!("[CONFIG] '{}' is not a cell count: {}", key, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delays() {
        let settings = Config::default().controller_settings();
        assert_eq!(settings.status_clear, Duration::from_millis(1500));
        assert_eq!(settings.bulk_status_clear, Duration::from_millis(1200));
        assert_eq!(settings.tab_status_clear, Duration::from_millis(1000));
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::parse(
            "status_clear_ms = 200\n\
             # popup_width = 10\n\
             popup_width = 70   # wider\n\
             log_level = debug\n\
             log_enabled = off\n\
             host_latency_ms = 25\n",
        );
        assert_eq!(config.status_clear, Duration::from_millis(200));
        assert_eq!(config.popup_width, 70);
        assert_eq!(config.log_config.level, LogLevel::Debug);
        assert!(!config.log_config.enabled);
        assert_eq!(config.host_latency(), Duration::from_millis(25));
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = Config::parse("menu_margin = -3\nstatus_clear_ms = soon\nbogus = 1\n");
        assert_eq!(config.menu_margin, DEFAULT_MENU_MARGIN);
        assert_eq!(config.status_clear, DEFAULT_STATUS_CLEAR);
    }

    #[test]
    fn test_default_file_parses_to_defaults() {
        let parsed = Config::parse(DEFAULT_EXTRELOADRC);
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_creates_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(".extreloadrc");

        let config = Config::load_from(&path).expect("load");
        assert!(path.exists());
        assert_eq!(config.config_path, path);
        assert_eq!(config.popup_width, DEFAULT_POPUP_WIDTH);
    }
}
