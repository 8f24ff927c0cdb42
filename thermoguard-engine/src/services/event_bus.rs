use std::sync::Mutex;

use thermoguard_api::events::{Event, EventPayload};
use time::OffsetDateTime;
use tokio::sync::broadcast;

/// Ordered, at-least-once fanout of derived domain events.
///
/// Every published event carries a process-wide monotone sequence number;
/// delivery order to every subscriber matches publish order. Subscribers that
/// fall more than the channel capacity behind observe a lag error instead of
/// stalling the publisher.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    next_seq: Mutex<u64>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        Self {
            sender,
            next_seq: Mutex::new(1),
        }
    }

    /// Assign the next sequence number and fan the event out to all current
    /// subscribers. Sequencing and send happen under one lock so the sequence
    /// order always matches the delivery order.
    pub fn publish(&self, timestamp: OffsetDateTime, payload: EventPayload) -> Event {
        let mut next_seq = match self.next_seq.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let event = Event {
            seq: *next_seq,
            timestamp,
            payload,
        };
        *next_seq += 1;

        // A send error only means there is no subscriber right now; the
        // engine's responsibility ends at publication.
        let _ = self.sender.send(event.clone());

        event
    }

    /// Live stream starting at the point of subscription; history comes only
    /// from the external durable log.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Continue the sequence after a replayed log instead of restarting at 1.
    pub fn resume_from(&self, next: u64) {
        let mut next_seq = match self.next_seq.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *next_seq = next;
    }
}
