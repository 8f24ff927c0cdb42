use std::env;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logger {
    pub level: String,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Thresholds and windows for the control and alerting loop.
///
/// Temperature offsets are relative to the room setpoint, the humidity offset
/// is relative to the room humidity target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Control {
    pub warning_offset: f32,
    pub critical_offset: f32,
    pub low_temp_offset: f32,
    pub humidity_offset: f32,
    pub silence_timeout_secs: u64,
    pub command_timeout_secs: u64,
    pub tick_interval_secs: u64,
}

impl Default for Control {
    fn default() -> Self {
        Self {
            warning_offset: 2.0,
            critical_offset: 5.0,
            low_temp_offset: 3.0,
            humidity_offset: 15.0,
            silence_timeout_secs: 300,
            command_timeout_secs: 30,
            tick_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Bus {
    /// Per-subscriber buffer; a subscriber further behind than this lags
    /// instead of blocking publication
    pub capacity: usize,
}

impl Default for Bus {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logger: Logger,
    pub control: Control,
    pub bus: Bus,
}

impl Settings {
    /// Load `configs/default.toml`, overlaid by `configs/{RUN_MODE}.toml`
    /// when that file exists, then by environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Path::new("configs"))
    }

    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::from(dir.join("default")))
            .add_source(File::from(dir.join(&run_mode)).required(false))
            .add_source(Environment::default().separator("_"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str("[logger]\nlevel = \"debug\"\n", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.logger.level, "debug");
        assert_eq!(settings.control.silence_timeout_secs, 300);
        assert_eq!(settings.bus.capacity, 256);
    }

    #[test]
    fn test_later_source_overlays_nested_values() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                "[control]\nwarning_offset = 2.0\ncritical_offset = 5.0\n",
                FileFormat::Toml,
            ))
            .add_source(File::from_str(
                "[control]\ncritical_offset = 4.0\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.control.warning_offset, 2.0);
        assert_eq!(settings.control.critical_offset, 4.0);
    }
}
