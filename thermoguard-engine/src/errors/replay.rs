use thermoguard_api::models::Id;

/// Fatal inconsistencies found while folding the durable event log.
///
/// The log is assumed internally consistent; any of these aborts startup
/// rather than producing partial state.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Event log gap: expected sequence {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("Replayed event references unregistered room {0}")]
    UnknownRoom(Id),

    #[error("Replayed event references unregistered sensor {0}")]
    UnknownSensor(Id),

    #[error("Replayed escalation or clear for an alert that is not open in room {room_id}")]
    AlertNotOpen { room_id: Id },
}
