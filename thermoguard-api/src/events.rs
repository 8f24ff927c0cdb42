use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{AcStatus, Alert, AlertCause, AlertSeverity, Id};

/// A sequenced domain event as delivered to bus subscribers.
///
/// `seq` increases by one per published event process-wide, so consumers can
/// detect gaps and total-order the stream. `timestamp` is the time of the
/// input that triggered the event, not the time of publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub timestamp: OffsetDateTime,
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Closed set of facts the engine can derive from one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EventPayload {
    ReadingApplied {
        room_id: Id,
        sensor_id: Id,
        temperature: f32,
        humidity: f32,
    },
    AcChanged {
        room_id: Id,
        status: AcStatus,
        /// Command this transition belongs to; `None` for replayed state
        command_id: Option<Uuid>,
    },
    AlertRaised {
        room_id: Id,
        alert: Alert,
    },
    AlertEscalated {
        room_id: Id,
        alert_id: Uuid,
        cause: AlertCause,
        severity: AlertSeverity,
        message: String,
    },
    AlertCleared {
        room_id: Id,
        alert_id: Uuid,
        cause: AlertCause,
    },
    SensorOffline {
        room_id: Id,
        sensor_id: Id,
    },
    SensorOnline {
        room_id: Id,
        sensor_id: Id,
    },
}

impl EventPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::ReadingApplied { .. } => "reading-applied",
            EventPayload::AcChanged { .. } => "ac-changed",
            EventPayload::AlertRaised { .. } => "alert-raised",
            EventPayload::AlertEscalated { .. } => "alert-escalated",
            EventPayload::AlertCleared { .. } => "alert-cleared",
            EventPayload::SensorOffline { .. } => "sensor-offline",
            EventPayload::SensorOnline { .. } => "sensor-online",
        }
    }

    pub fn room_id(&self) -> Id {
        match self {
            EventPayload::ReadingApplied { room_id, .. }
            | EventPayload::AcChanged { room_id, .. }
            | EventPayload::AlertRaised { room_id, .. }
            | EventPayload::AlertEscalated { room_id, .. }
            | EventPayload::AlertCleared { room_id, .. }
            | EventPayload::SensorOffline { room_id, .. }
            | EventPayload::SensorOnline { room_id, .. } => *room_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_kind_matches_wire_tag() {
        let event = Event {
            seq: 1,
            timestamp: datetime!(2025-01-01 00:00:00 UTC),
            payload: EventPayload::SensorOffline {
                room_id: 3,
                sensor_id: 7,
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], event.payload.kind());
        assert_eq!(json["seq"], 1);
        assert_eq!(json["room_id"], 3);
    }

    #[test]
    fn test_round_trip() {
        let event = Event {
            seq: 42,
            timestamp: datetime!(2025-06-01 12:00:00 UTC),
            payload: EventPayload::AcChanged {
                room_id: 1,
                status: AcStatus::On,
                command_id: Some(Uuid::new_v4()),
            },
        };

        let json = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);
    }
}
