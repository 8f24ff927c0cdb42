use thermoguard_api::events::EventPayload;
use thermoguard_api::models::{Alert, AlertCause, AlertSeverity};
use time::OffsetDateTime;

use super::RoomState;

/// Deviation thresholds for alert classification.
///
/// Temperature offsets are relative to the room setpoint, the humidity offset
/// to the room humidity target.
#[derive(Debug, Clone)]
pub struct AlertThresholds {
    pub warning_offset: f32,
    pub critical_offset: f32,
    pub low_temp_offset: f32,
    pub humidity_offset: f32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning_offset: 2.0,
            critical_offset: 5.0,
            low_temp_offset: 3.0,
            humidity_offset: 15.0,
        }
    }
}

/// Owns the alert lifecycle: classification, escalation, auto-close.
///
/// A room holds at most one open alert per cause. A condition whose severity
/// increases escalates the existing alert in place; a condition that stops
/// matching auto-closes it regardless of acknowledgement. A condition that
/// keeps matching at or below the current severity leaves the alert as is.
pub struct AlertEngine {
    thresholds: AlertThresholds,
}

impl AlertEngine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// Re-evaluate every cause for a room against its current state and
    /// return the resulting lifecycle transitions in a fixed cause order.
    pub fn evaluate(&self, now: OffsetDateTime, state: &mut RoomState) -> Vec<EventPayload> {
        let room_id = state.room.id;
        let mut transitions = Vec::new();

        for cause in AlertCause::ALL {
            let desired = self.classify(cause, state);
            let current = state.open_alerts.get(&cause).map(|alert| alert.severity);

            match (current, desired) {
                (None, Some((severity, message))) => {
                    let alert = Alert::open(room_id, cause, severity, message, now);
                    state.open_alerts.insert(cause, alert.clone());
                    transitions.push(EventPayload::AlertRaised { room_id, alert });
                }
                (Some(open_severity), Some((severity, message))) if severity > open_severity => {
                    if let Some(alert) = state.open_alerts.get_mut(&cause) {
                        alert.escalate(severity, message.clone());
                        transitions.push(EventPayload::AlertEscalated {
                            room_id,
                            alert_id: alert.id,
                            cause,
                            severity,
                            message,
                        });
                    }
                }
                (Some(_), Some(_)) => {}
                (Some(_), None) => {
                    if let Some(mut alert) = state.open_alerts.remove(&cause) {
                        alert.close(now);
                        transitions.push(EventPayload::AlertCleared {
                            room_id,
                            alert_id: alert.id,
                            cause,
                        });
                    }
                }
                (None, None) => {}
            }
        }

        transitions
    }

    /// Severity the current state warrants for one cause; `None` when the
    /// condition does not match. First match wins per cause.
    fn classify(&self, cause: AlertCause, state: &RoomState) -> Option<(AlertSeverity, String)> {
        let room = &state.room;

        match cause {
            AlertCause::HighTemp => {
                let t = room.last_reading.as_ref()?.temperature;
                if t > room.setpoint + self.thresholds.critical_offset {
                    Some((
                        AlertSeverity::Critical,
                        format!(
                            "Critical temperature: {:.1}C (limit {:.1}C)",
                            t,
                            room.setpoint + self.thresholds.critical_offset
                        ),
                    ))
                } else if t > room.setpoint + self.thresholds.warning_offset {
                    Some((
                        AlertSeverity::Warning,
                        format!(
                            "High temperature: {:.1}C (setpoint {:.1}C)",
                            t, room.setpoint
                        ),
                    ))
                } else {
                    None
                }
            }
            AlertCause::LowTemp => {
                let t = room.last_reading.as_ref()?.temperature;
                if t < room.setpoint - self.thresholds.low_temp_offset {
                    Some((
                        AlertSeverity::Warning,
                        format!("Low temperature: {:.1}C (setpoint {:.1}C)", t, room.setpoint),
                    ))
                } else {
                    None
                }
            }
            AlertCause::HighHumidity => {
                let h = room.last_reading.as_ref()?.humidity;
                if h > room.target_humidity + self.thresholds.humidity_offset {
                    Some((
                        AlertSeverity::Warning,
                        format!(
                            "High humidity: {:.1}% (limit {:.1}%)",
                            h,
                            room.target_humidity + self.thresholds.humidity_offset
                        ),
                    ))
                } else {
                    None
                }
            }
            AlertCause::SensorOffline => {
                let offline = state.offline_sensors();
                let first = offline.first()?;
                Some((
                    AlertSeverity::Warning,
                    format!("Sensor offline: {}", first.device_id),
                ))
            }
            AlertCause::AcCommandFailure => {
                if room.last_command_failed {
                    Some((
                        AlertSeverity::Warning,
                        format!("AC command failed for room {}", room.name),
                    ))
                } else {
                    None
                }
            }
        }
    }
}
