use thermoguard_api::events::{Event, EventPayload};
use thermoguard_api::models::{AcStatus, Command, CommandResult, Reading, Room, Sensor};
use time::{Duration, OffsetDateTime};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::configs::Settings;
use crate::errors::EngineError;

use super::{
    AlertEngine, AlertThresholds, ApplyOutcome, Decision, EventBus, HysteresisController,
    OfflineDetector, RoomState, RoomStore,
};

/// The control and alerting engine.
///
/// All transitions for one room (reading application, control decision, alert
/// evaluation, event publication) run as one atomic step under that room's
/// lock; different rooms proceed in parallel. The engine owns no transport:
/// readings, command results, and ticks come in through the methods below,
/// commands go out through an `mpsc` channel, and every derived fact is
/// published to the event bus before the room's step completes.
pub struct ClimateEngine {
    store: RoomStore,
    detector: OfflineDetector,
    alerts: AlertEngine,
    bus: EventBus,
    command_tx: mpsc::UnboundedSender<Command>,
    command_timeout: Duration,
}

impl ClimateEngine {
    /// Build an engine and the receiving end of its outbound command channel,
    /// to be drained by the external dispatcher.
    pub fn new(settings: &Settings) -> (Self, mpsc::UnboundedReceiver<Command>) {
        let control = &settings.control;
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let engine = Self {
            store: RoomStore::new(),
            detector: OfflineDetector::new(Duration::seconds(control.silence_timeout_secs as i64)),
            alerts: AlertEngine::new(AlertThresholds {
                warning_offset: control.warning_offset,
                critical_offset: control.critical_offset,
                low_temp_offset: control.low_temp_offset,
                humidity_offset: control.humidity_offset,
            }),
            bus: EventBus::new(settings.bus.capacity),
            command_tx,
            command_timeout: Duration::seconds(control.command_timeout_secs as i64),
        };

        (engine, command_rx)
    }

    pub fn store(&self) -> &RoomStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    pub async fn add_room(&self, room: Room) {
        self.store.add_room(room).await;
    }

    pub async fn add_sensor(&self, sensor: Sensor) -> Result<(), EngineError> {
        self.store.add_sensor(sensor).await
    }

    /// Apply one sensor reading: update room state, run the hysteresis
    /// controller, re-evaluate alerts, and publish the derived events in
    /// causal order. Stale readings are acknowledged without side effects.
    pub async fn submit_reading(&self, reading: Reading) -> Result<ApplyOutcome, EngineError> {
        let (room_id, slot) = self.store.slot_for_sensor(reading.sensor_id).await?;
        let mut state = slot.lock().await;

        let outcome = state.apply_reading(&reading)?;
        if outcome == ApplyOutcome::Stale {
            debug!(
                room_id,
                sensor_id = reading.sensor_id,
                "Discarding stale reading"
            );
            return Ok(outcome);
        }

        self.bus.publish(
            reading.timestamp,
            EventPayload::ReadingApplied {
                room_id,
                sensor_id: reading.sensor_id,
                temperature: reading.temperature,
                humidity: reading.humidity,
            },
        );

        if outcome == (ApplyOutcome::Applied { came_online: true }) {
            info!(room_id, sensor_id = reading.sensor_id, "Sensor back online");
            self.bus.publish(
                reading.timestamp,
                EventPayload::SensorOnline {
                    room_id,
                    sensor_id: reading.sensor_id,
                },
            );
        }

        if state.room.is_automatic() {
            match HysteresisController::evaluate(&state.room) {
                Decision::TurnOn => self.issue_command(&mut state, AcStatus::On, reading.timestamp),
                Decision::TurnOff => {
                    self.issue_command(&mut state, AcStatus::Off, reading.timestamp)
                }
                Decision::NoChange => {}
            }
        }

        self.evaluate_alerts(reading.timestamp, &mut state);

        Ok(outcome)
    }

    /// Feed back the acknowledgement for a previously issued command. Success
    /// finalizes the optimistic status; failure marks the AC faulted and
    /// raises an alert. Results for commands already expired are dropped.
    pub async fn submit_command_result(&self, result: CommandResult) -> Result<(), EngineError> {
        let slot = self.store.slot(result.room_id).await?;
        let mut state = slot.lock().await;

        let Some(command) = state.pending_commands.remove(&result.command_id) else {
            debug!(
                room_id = result.room_id,
                command_id = %result.command_id,
                "Acknowledgement for unknown or expired command"
            );
            return Ok(());
        };

        if result.success {
            info!(
                room_id = state.room.id,
                command_id = %command.id,
                status = ?command.target_status,
                "AC command acknowledged"
            );
            state.room.ac_status = command.target_status;
            state.room.last_command_failed = false;
        } else {
            warn!(
                room_id = state.room.id,
                command_id = %command.id,
                "AC command failed"
            );
            state.room.ac_status = AcStatus::Fault;
            state.room.last_command_failed = true;
        }

        self.bus.publish(
            result.timestamp,
            EventPayload::AcChanged {
                room_id: state.room.id,
                status: state.room.ac_status,
                command_id: Some(command.id),
            },
        );

        self.evaluate_alerts(result.timestamp, &mut state);

        Ok(())
    }

    /// Advance logical time: sweep silent sensors offline, expire
    /// unacknowledged commands, and re-evaluate alerts per room.
    pub async fn tick(&self, now: OffsetDateTime) {
        for (room_id, slot) in self.store.slots().await {
            let mut state = slot.lock().await;

            for sensor_id in self.detector.sweep(now, &mut state) {
                warn!(room_id, sensor_id, "Sensor marked offline");
                self.bus
                    .publish(now, EventPayload::SensorOffline { room_id, sensor_id });
            }

            self.expire_commands(now, &mut state);

            self.evaluate_alerts(now, &mut state);
        }
    }

    /// Record an operator acknowledgement on an open alert. Acknowledgement
    /// never blocks auto-close and never changes severity.
    pub async fn acknowledge_alert(
        &self,
        alert_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<(), EngineError> {
        for (room_id, slot) in self.store.slots().await {
            let mut state = slot.lock().await;
            if let Some(alert) = state
                .open_alerts
                .values_mut()
                .find(|alert| alert.id == alert_id)
            {
                alert.acknowledge(at);
                info!(room_id, alert_id = %alert_id, "Alert acknowledged");
                return Ok(());
            }
        }

        Err(EngineError::UnknownAlert(alert_id))
    }

    /// Crash recovery: fold the durable event log into the registered
    /// topology and continue the event sequence where the log left off.
    pub async fn rebuild_from_event_log(&self, events: &[Event]) -> Result<(), EngineError> {
        if let Some(last_seq) = self.store.rebuild_from_event_log(events).await? {
            self.bus.resume_from(last_seq + 1);
        }
        info!(events = events.len(), "State rebuilt from event log");

        Ok(())
    }

    fn issue_command(&self, state: &mut RoomState, target: AcStatus, at: OffsetDateTime) {
        let command = Command::new(state.room.id, target, at);
        info!(
            room_id = state.room.id,
            command_id = %command.id,
            target = ?target,
            "Issuing AC command"
        );

        state.room.ac_status = AcStatus::Unknown;
        self.bus.publish(
            at,
            EventPayload::AcChanged {
                room_id: state.room.id,
                status: AcStatus::Unknown,
                command_id: Some(command.id),
            },
        );

        state.pending_commands.insert(command.id, command.clone());
        // A gone dispatcher leaves the command pending; the timeout sweep
        // converts it into a failure like any other lost command.
        if self.command_tx.send(command).is_err() {
            warn!(room_id = state.room.id, "Command dispatcher is gone");
        }
    }

    fn expire_commands(&self, now: OffsetDateTime, state: &mut RoomState) {
        let expired: Vec<Uuid> = state
            .pending_commands
            .values()
            .filter(|command| now - command.issued_at > self.command_timeout)
            .map(|command| command.id)
            .collect();

        for command_id in expired {
            state.pending_commands.remove(&command_id);
            warn!(
                room_id = state.room.id,
                command_id = %command_id,
                "AC command timed out"
            );

            state.room.last_command_failed = true;
            if state.room.ac_status != AcStatus::Fault {
                state.room.ac_status = AcStatus::Fault;
                self.bus.publish(
                    now,
                    EventPayload::AcChanged {
                        room_id: state.room.id,
                        status: AcStatus::Fault,
                        command_id: Some(command_id),
                    },
                );
            }
        }

        // Unknown only ever coexists with a pending entry. After a restart
        // the entry is gone and the acknowledgement can never be matched, so
        // the lost command fails without waiting out the timeout; the next
        // reading then retries through the Fault path.
        if state.room.ac_status == AcStatus::Unknown && state.pending_commands.is_empty() {
            warn!(
                room_id = state.room.id,
                "In-flight AC command lost across restart"
            );
            state.room.last_command_failed = true;
            state.room.ac_status = AcStatus::Fault;
            self.bus.publish(
                now,
                EventPayload::AcChanged {
                    room_id: state.room.id,
                    status: AcStatus::Fault,
                    command_id: None,
                },
            );
        }
    }

    fn evaluate_alerts(&self, at: OffsetDateTime, state: &mut RoomState) {
        for payload in self.alerts.evaluate(at, state) {
            match &payload {
                EventPayload::AlertRaised { alert, .. } => info!(
                    room_id = alert.room_id,
                    cause = ?alert.cause,
                    severity = ?alert.severity,
                    "Alert raised: {}", alert.message
                ),
                EventPayload::AlertEscalated {
                    room_id,
                    cause,
                    severity,
                    ..
                } => warn!(room_id, cause = ?cause, severity = ?severity, "Alert escalated"),
                EventPayload::AlertCleared { room_id, cause, .. } => {
                    info!(room_id, cause = ?cause, "Alert cleared")
                }
                _ => {}
            }
            self.bus.publish(at, payload);
        }
    }
}
