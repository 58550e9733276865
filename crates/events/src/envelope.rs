use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// Envelope for an event, carrying the metadata a publisher needs.
///
/// Notes:
/// - `aggregate_version` is the aggregate's version **after** the operation that
///   produced the event.
/// - `position` orders events produced by the same operation (0-based). Consumers
///   must process envelopes of one aggregate in `(aggregate_version, position)` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,

    aggregate_type: String,
    aggregate_id: String,
    aggregate_version: u64,
    position: usize,

    event_type: String,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_version: u64,
        position: usize,
        event_type: impl Into<String>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.into(),
            aggregate_version,
            position,
            event_type: event_type.into(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_version(&self) -> u64 {
        self.aggregate_version
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap the events of one operation, preserving their order.
    ///
    /// Event ids are UUIDv7 (time-ordered).
    pub fn wrap_all(
        aggregate_type: &str,
        aggregate_id: &str,
        aggregate_version: u64,
        events: Vec<E>,
    ) -> Vec<Self> {
        events
            .into_iter()
            .enumerate()
            .map(|(idx, payload)| {
                Self::new(
                    Uuid::now_v7(),
                    aggregate_type,
                    aggregate_id,
                    aggregate_version,
                    idx,
                    payload.event_type(),
                    payload,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ping(u8);

    impl Event for Ping {
        fn event_type(&self) -> &'static str {
            "test.ping"
        }

        fn version(&self) -> u32 {
            1
        }
    }

    #[test]
    fn wrap_all_keeps_order_and_metadata() {
        let envelopes = EventEnvelope::wrap_all("product", "SMALL-TABLE", 3, vec![Ping(1), Ping(2)]);

        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].payload(), &Ping(1));
        assert_eq!(envelopes[1].payload(), &Ping(2));
        assert_eq!(envelopes[0].position(), 0);
        assert_eq!(envelopes[1].position(), 1);
        assert!(envelopes.iter().all(|e| e.aggregate_version() == 3));
        assert!(envelopes.iter().all(|e| e.aggregate_id() == "SMALL-TABLE"));
        assert!(envelopes.iter().all(|e| e.event_type() == "test.ping"));
        assert_ne!(envelopes[0].event_id(), envelopes[1].event_id());
    }

    #[test]
    fn envelope_serializes_with_payload() {
        let envelope = EventEnvelope::wrap_all("product", "LAMP", 1, vec![Ping(7)]).remove(0);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["aggregate_type"], "product");
        assert_eq!(json["event_type"], "test.ping");
        assert_eq!(json["payload"], 7);
    }
}
