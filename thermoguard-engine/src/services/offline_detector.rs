use thermoguard_api::models::{Id, Liveness};
use time::{Duration, OffsetDateTime};

use super::RoomState;

/// Per-sensor liveness tracking, driven only by the external tick signal so
/// tests can advance logical time deterministically.
pub struct OfflineDetector {
    silence_timeout: Duration,
}

impl OfflineDetector {
    pub fn new(silence_timeout: Duration) -> Self {
        Self { silence_timeout }
    }

    /// Mark online sensors silent for longer than the timeout as offline and
    /// return them. A sensor transitions at most once per silence window; the
    /// reverse transition happens on the store's apply path when a reading
    /// arrives. Sensors that have never reported are skipped.
    pub fn sweep(&self, now: OffsetDateTime, state: &mut RoomState) -> Vec<Id> {
        let mut newly_offline = Vec::new();

        for sensor in state.sensors.values_mut() {
            if sensor.liveness != Liveness::Online {
                continue;
            }
            let Some(last_seen) = sensor.last_seen else {
                continue;
            };

            if now - last_seen > self.silence_timeout {
                sensor.liveness = Liveness::Offline;
                newly_offline.push(sensor.id);
            }
        }

        newly_offline.sort_unstable();
        newly_offline
    }
}
