use serde::{Deserialize, Serialize};

use super::{Id, Reading};

/// Default deadband around the setpoint in Celsius.
pub const DEFAULT_HYSTERESIS_BAND: f32 = 1.0;

/// Default relative humidity target percentage.
pub const DEFAULT_TARGET_HUMIDITY: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcStatus {
    On,
    Off,
    /// A command is in flight and not yet acknowledged
    Unknown,
    /// The last command for this room failed or timed out
    Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// The engine drives the AC from sensor readings
    Automatic,
    /// Operators control the AC; the engine only observes and alerts
    Manual,
}

/// A monitored data-center room and its climate control state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Id,
    pub name: String,
    /// Target temperature in Celsius
    pub setpoint: f32,
    /// Deadband around the setpoint in Celsius
    pub hysteresis_band: f32,
    /// Target relative humidity percentage
    pub target_humidity: f32,
    pub operation_mode: OperationMode,
    pub ac_status: AcStatus,
    /// Most recent reading applied to this room
    pub last_reading: Option<Reading>,
    /// Whether the most recent AC command failed or timed out
    pub last_command_failed: bool,
}

impl Room {
    pub fn new(id: Id, name: impl Into<String>, setpoint: f32) -> Self {
        Self {
            id,
            name: name.into(),
            setpoint,
            hysteresis_band: DEFAULT_HYSTERESIS_BAND,
            target_humidity: DEFAULT_TARGET_HUMIDITY,
            operation_mode: OperationMode::Automatic,
            ac_status: AcStatus::Off,
            last_reading: None,
            last_command_failed: false,
        }
    }

    pub fn with_hysteresis_band(mut self, band: f32) -> Self {
        self.hysteresis_band = band;
        self
    }

    pub fn with_target_humidity(mut self, target: f32) -> Self {
        self.target_humidity = target;
        self
    }

    pub fn with_operation_mode(mut self, mode: OperationMode) -> Self {
        self.operation_mode = mode;
        self
    }

    pub fn is_automatic(&self) -> bool {
        self.operation_mode == OperationMode::Automatic
    }
}
