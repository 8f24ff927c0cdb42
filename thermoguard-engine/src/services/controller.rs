use thermoguard_api::models::{AcStatus, Room};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    NoChange,
    TurnOn,
    TurnOff,
}

/// One-sided deadband control around the room setpoint.
///
/// Turning on requires crossing the upper band edge and turning off the lower
/// one, so sensor noise around the setpoint cannot toggle the AC. Decisions
/// are pure; the caller issues the command and tracks the optimistic status.
pub struct HysteresisController;

impl HysteresisController {
    pub fn evaluate(room: &Room) -> Decision {
        let Some(reading) = &room.last_reading else {
            return Decision::NoChange;
        };

        let t = reading.temperature;
        let s = room.setpoint;
        let h = room.hysteresis_band;

        match room.ac_status {
            // Fault behaves like Off so the loop can retry after a failed
            // command; a later success clears the failure alert.
            AcStatus::Off | AcStatus::Fault if t >= s + h => Decision::TurnOn,
            AcStatus::On if t <= s - h => Decision::TurnOff,
            // Unknown means a command is in flight; wait for the result.
            _ => Decision::NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use thermoguard_api::models::Reading;
    use time::macros::datetime;

    use super::*;

    fn room_at(temperature: f32, ac_status: AcStatus) -> Room {
        let mut room = Room::new(1, "server-room-a", 22.0);
        room.ac_status = ac_status;
        room.last_reading = Some(Reading::new(
            10,
            datetime!(2025-01-01 00:00:00 UTC),
            temperature,
            45.0,
        ));
        room
    }

    #[test]
    fn test_turn_on_is_boundary_inclusive() {
        assert_eq!(
            HysteresisController::evaluate(&room_at(22.9, AcStatus::Off)),
            Decision::NoChange
        );
        assert_eq!(
            HysteresisController::evaluate(&room_at(23.0, AcStatus::Off)),
            Decision::TurnOn
        );
    }

    #[test]
    fn test_turn_off_is_boundary_inclusive() {
        assert_eq!(
            HysteresisController::evaluate(&room_at(21.1, AcStatus::On)),
            Decision::NoChange
        );
        assert_eq!(
            HysteresisController::evaluate(&room_at(21.0, AcStatus::On)),
            Decision::TurnOff
        );
    }

    #[test]
    fn test_deadband_prevents_flapping() {
        // Inside the band nothing moves, in either direction.
        assert_eq!(
            HysteresisController::evaluate(&room_at(22.5, AcStatus::On)),
            Decision::NoChange
        );
        assert_eq!(
            HysteresisController::evaluate(&room_at(22.5, AcStatus::Off)),
            Decision::NoChange
        );
    }

    #[test]
    fn test_in_flight_command_blocks_decisions() {
        assert_eq!(
            HysteresisController::evaluate(&room_at(30.0, AcStatus::Unknown)),
            Decision::NoChange
        );
    }

    #[test]
    fn test_fault_retries_turn_on() {
        assert_eq!(
            HysteresisController::evaluate(&room_at(23.0, AcStatus::Fault)),
            Decision::TurnOn
        );
        assert_eq!(
            HysteresisController::evaluate(&room_at(22.0, AcStatus::Fault)),
            Decision::NoChange
        );
    }

    #[test]
    fn test_no_reading_no_decision() {
        let room = Room::new(1, "server-room-a", 22.0);
        assert_eq!(
            HysteresisController::evaluate(&room),
            Decision::NoChange
        );
    }
}
