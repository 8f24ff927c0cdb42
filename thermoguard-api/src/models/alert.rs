use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCause {
    HighTemp,
    LowTemp,
    HighHumidity,
    SensorOffline,
    AcCommandFailure,
}

impl AlertCause {
    /// Evaluation order for a room; also the stable iteration order for
    /// open-alert bookkeeping.
    pub const ALL: [AlertCause; 5] = [
        AlertCause::HighTemp,
        AlertCause::LowTemp,
        AlertCause::HighHumidity,
        AlertCause::SensorOffline,
        AlertCause::AcCommandFailure,
    ];
}

/// An open or closed alert bound to a room.
///
/// A room holds at most one open alert per cause; a persisting condition of
/// higher severity escalates the existing alert in place instead of opening
/// a second one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub room_id: Id,
    pub cause: AlertCause,
    pub severity: AlertSeverity,
    pub message: String,
    pub opened_at: OffsetDateTime,
    pub acknowledged_at: Option<OffsetDateTime>,
    pub closed_at: Option<OffsetDateTime>,
}

impl Alert {
    pub fn open(
        room_id: Id,
        cause: AlertCause,
        severity: AlertSeverity,
        message: impl Into<String>,
        opened_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            cause,
            severity,
            message: message.into(),
            opened_at,
            acknowledged_at: None,
            closed_at: None,
        }
    }

    /// Record an operator acknowledgement. Never blocks auto-close and never
    /// changes severity.
    pub fn acknowledge(&mut self, at: OffsetDateTime) {
        self.acknowledged_at = Some(at);
    }

    /// Raise the severity of an open alert in place.
    pub fn escalate(&mut self, severity: AlertSeverity, message: impl Into<String>) {
        self.severity = severity;
        self.message = message.into();
    }

    pub fn close(&mut self, at: OffsetDateTime) {
        self.closed_at = Some(at);
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}
