use thermoguard_api::models::Id;
use uuid::Uuid;

use super::ReplayError;

/// Domain errors surfaced to the transport layer.
///
/// All variants are local to one input; a rejected input never mutates state
/// and never affects another room's processing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Sensor {0} is not registered")]
    UnknownSensor(Id),

    #[error("Room {0} is not registered")]
    UnknownRoom(Id),

    #[error("Alert {0} is not open")]
    UnknownAlert(Uuid),

    #[error(transparent)]
    Replay(#[from] ReplayError),
}
