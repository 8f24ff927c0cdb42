use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    Online,
    Offline,
}

/// A temperature/humidity sensor bound to exactly one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: Id,
    /// Hardware identifier reported by the device (e.g. MAC address)
    pub device_id: String,
    pub room_id: Id,
    pub liveness: Liveness,
    /// Timestamp of the last reading applied for this sensor
    pub last_seen: Option<OffsetDateTime>,
    pub last_temperature: Option<f32>,
    pub last_humidity: Option<f32>,
}

impl Sensor {
    pub fn new(id: Id, device_id: impl Into<String>, room_id: Id) -> Self {
        Self {
            id,
            device_id: device_id.into(),
            room_id,
            liveness: Liveness::Online,
            last_seen: None,
            last_temperature: None,
            last_humidity: None,
        }
    }

    pub fn is_online(&self) -> bool {
        self.liveness == Liveness::Online
    }
}
