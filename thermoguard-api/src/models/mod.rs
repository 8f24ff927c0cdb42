mod alert;
mod command;
mod room;
mod sensor;

pub use alert::*;
pub use command::*;
pub use room::*;
pub use sensor::*;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type Id = i32;

/// Immutable measurement reported by a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub sensor_id: Id,
    /// Measurement timestamp assigned by the sensor, used as the ordering key
    pub timestamp: OffsetDateTime,
    /// Temperature in Celsius
    pub temperature: f32,
    /// Relative humidity percentage
    pub humidity: f32,
}

impl Reading {
    pub fn new(sensor_id: Id, timestamp: OffsetDateTime, temperature: f32, humidity: f32) -> Self {
        Self {
            sensor_id,
            timestamp,
            temperature,
            humidity,
        }
    }
}
