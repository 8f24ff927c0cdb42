use std::collections::HashMap;
use std::sync::Arc;

use thermoguard_api::events::{Event, EventPayload};
use thermoguard_api::models::{
    AcStatus, Alert, AlertCause, Command, Id, Liveness, Reading, Room, Sensor,
};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::errors::{EngineError, ReplayError};

/// Outcome of applying a reading to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied {
        /// The reading brought an offline sensor back
        came_online: bool,
    },
    /// Not newer than the room's last applied reading; acknowledged to the
    /// transport but nothing was mutated
    Stale,
}

/// Mutable state of one room, only ever touched under that room's lock.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub room: Room,
    pub sensors: HashMap<Id, Sensor>,
    /// At most one open alert per cause
    pub open_alerts: HashMap<AlertCause, Alert>,
    /// Commands awaiting acknowledgement, swept on tick
    pub pending_commands: HashMap<Uuid, Command>,
}

impl RoomState {
    fn new(room: Room) -> Self {
        Self {
            room,
            sensors: HashMap::new(),
            open_alerts: HashMap::new(),
            pending_commands: HashMap::new(),
        }
    }

    /// Apply a reading iff it is strictly newer than the room's last applied
    /// one. Applying flips an offline sensor back online; the caller emits
    /// the corresponding events.
    pub fn apply_reading(&mut self, reading: &Reading) -> Result<ApplyOutcome, EngineError> {
        let sensor = self
            .sensors
            .get_mut(&reading.sensor_id)
            .ok_or(EngineError::UnknownSensor(reading.sensor_id))?;

        if let Some(last) = &self.room.last_reading {
            if reading.timestamp <= last.timestamp {
                return Ok(ApplyOutcome::Stale);
            }
        }

        let came_online = sensor.liveness == Liveness::Offline;
        sensor.liveness = Liveness::Online;
        sensor.last_seen = Some(reading.timestamp);
        sensor.last_temperature = Some(reading.temperature);
        sensor.last_humidity = Some(reading.humidity);
        self.room.last_reading = Some(reading.clone());

        Ok(ApplyOutcome::Applied { came_online })
    }

    pub fn offline_sensors(&self) -> Vec<&Sensor> {
        let mut offline: Vec<&Sensor> = self
            .sensors
            .values()
            .filter(|sensor| !sensor.is_online())
            .collect();
        offline.sort_by_key(|sensor| sensor.id);
        offline
    }
}

/// In-memory authoritative state for all monitored rooms.
///
/// State is partitioned by room: each room sits behind its own lock, so all
/// transitions for one room are serialized while different rooms proceed in
/// parallel. The store performs no I/O; recovery replays the external durable
/// event log through [`RoomStore::rebuild_from_event_log`].
pub struct RoomStore {
    rooms: RwLock<HashMap<Id, Arc<Mutex<RoomState>>>>,
    sensor_rooms: RwLock<HashMap<Id, Id>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            sensor_rooms: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_room(&self, room: Room) {
        let mut rooms = self.rooms.write().await;
        rooms.insert(room.id, Arc::new(Mutex::new(RoomState::new(room))));
    }

    pub async fn add_sensor(&self, sensor: Sensor) -> Result<(), EngineError> {
        let slot = self.slot(sensor.room_id).await?;

        let mut sensor_rooms = self.sensor_rooms.write().await;
        sensor_rooms.insert(sensor.id, sensor.room_id);

        let mut state = slot.lock().await;
        state.sensors.insert(sensor.id, sensor);

        Ok(())
    }

    pub async fn slot(&self, room_id: Id) -> Result<Arc<Mutex<RoomState>>, EngineError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(&room_id)
            .cloned()
            .ok_or(EngineError::UnknownRoom(room_id))
    }

    pub async fn slot_for_sensor(
        &self,
        sensor_id: Id,
    ) -> Result<(Id, Arc<Mutex<RoomState>>), EngineError> {
        let room_id = {
            let sensor_rooms = self.sensor_rooms.read().await;
            sensor_rooms
                .get(&sensor_id)
                .copied()
                .ok_or(EngineError::UnknownSensor(sensor_id))?
        };

        Ok((room_id, self.slot(room_id).await?))
    }

    pub async fn get_room(&self, room_id: Id) -> Option<Room> {
        let slot = self.slot(room_id).await.ok()?;
        let state = slot.lock().await;
        Some(state.room.clone())
    }

    pub async fn get_sensor(&self, sensor_id: Id) -> Option<Sensor> {
        let (_, slot) = self.slot_for_sensor(sensor_id).await.ok()?;
        let state = slot.lock().await;
        state.sensors.get(&sensor_id).cloned()
    }

    pub async fn list_rooms(&self) -> Vec<Room> {
        let slots = self.slots().await;

        let mut rooms = Vec::with_capacity(slots.len());
        for (_, slot) in slots {
            let state = slot.lock().await;
            rooms.push(state.room.clone());
        }
        rooms.sort_by_key(|room| room.id);
        rooms
    }

    pub async fn open_alerts(&self, room_id: Id) -> Vec<Alert> {
        let Ok(slot) = self.slot(room_id).await else {
            return Vec::new();
        };
        let state = slot.lock().await;

        let mut alerts: Vec<Alert> = state.open_alerts.values().cloned().collect();
        alerts.sort_by_key(|alert| (alert.opened_at, alert.id));
        alerts
    }

    /// Snapshot of all room slots, for tick sweeps and replay.
    pub async fn slots(&self) -> Vec<(Id, Arc<Mutex<RoomState>>)> {
        let rooms = self.rooms.read().await;
        let mut slots: Vec<(Id, Arc<Mutex<RoomState>>)> = rooms
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();
        slots.sort_by_key(|(id, _)| *id);
        slots
    }

    /// Deterministic fold of a complete, ordered event log into the current
    /// (freshly registered) topology. Returns the last replayed sequence
    /// number so publication can resume from there.
    ///
    /// Sequence numbers must be contiguous; a gap aborts recovery.
    pub async fn rebuild_from_event_log(
        &self,
        events: &[Event],
    ) -> Result<Option<u64>, ReplayError> {
        let mut expected: Option<u64> = None;

        for event in events {
            if let Some(expected) = expected {
                if event.seq != expected {
                    return Err(ReplayError::SequenceGap {
                        expected,
                        found: event.seq,
                    });
                }
            }
            expected = Some(event.seq + 1);

            self.apply_replayed(event).await?;
        }

        Ok(events.last().map(|event| event.seq))
    }

    async fn apply_replayed(&self, event: &Event) -> Result<(), ReplayError> {
        let room_id = event.payload.room_id();
        let slot = self
            .slot(room_id)
            .await
            .map_err(|_| ReplayError::UnknownRoom(room_id))?;
        let mut state = slot.lock().await;

        match &event.payload {
            EventPayload::ReadingApplied {
                sensor_id,
                temperature,
                humidity,
                ..
            } => {
                let reading = Reading::new(*sensor_id, event.timestamp, *temperature, *humidity);
                match state.apply_reading(&reading) {
                    // A replayed log has strictly increasing reading
                    // timestamps per room, so Stale only occurs when the same
                    // log is folded twice; ignoring it keeps replay idempotent.
                    Ok(_) => {}
                    Err(_) => return Err(ReplayError::UnknownSensor(*sensor_id)),
                }
            }
            EventPayload::AcChanged { status, .. } => {
                state.room.ac_status = *status;
                match status {
                    AcStatus::Fault => state.room.last_command_failed = true,
                    AcStatus::On | AcStatus::Off => state.room.last_command_failed = false,
                    AcStatus::Unknown => {}
                }
            }
            EventPayload::SensorOffline { sensor_id, .. } => {
                let sensor = state
                    .sensors
                    .get_mut(sensor_id)
                    .ok_or(ReplayError::UnknownSensor(*sensor_id))?;
                sensor.liveness = Liveness::Offline;
            }
            EventPayload::SensorOnline { sensor_id, .. } => {
                let sensor = state
                    .sensors
                    .get_mut(sensor_id)
                    .ok_or(ReplayError::UnknownSensor(*sensor_id))?;
                sensor.liveness = Liveness::Online;
            }
            EventPayload::AlertRaised { alert, .. } => {
                state.open_alerts.insert(alert.cause, alert.clone());
            }
            EventPayload::AlertEscalated {
                cause,
                severity,
                message,
                ..
            } => {
                let alert = state
                    .open_alerts
                    .get_mut(cause)
                    .ok_or(ReplayError::AlertNotOpen { room_id })?;
                alert.escalate(*severity, message.clone());
            }
            EventPayload::AlertCleared { cause, .. } => {
                state
                    .open_alerts
                    .remove(cause)
                    .ok_or(ReplayError::AlertNotOpen { room_id })?;
            }
        }

        Ok(())
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}
