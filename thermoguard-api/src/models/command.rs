use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{AcStatus, Id};

/// Fire-and-forget AC instruction handed to the external dispatcher.
///
/// Commands are not part of rebuildable state; an unacknowledged command is
/// converted into a failure once the timeout window elapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: Uuid,
    pub room_id: Id,
    pub target_status: AcStatus,
    pub issued_at: OffsetDateTime,
}

impl Command {
    pub fn new(room_id: Id, target_status: AcStatus, issued_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            target_status,
            issued_at,
        }
    }
}

/// Acknowledgement for a previously issued command, stamped by the transport
/// on receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub command_id: Uuid,
    pub room_id: Id,
    pub success: bool,
    pub timestamp: OffsetDateTime,
}
