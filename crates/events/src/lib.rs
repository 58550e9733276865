//! Domain events and the in-process publication seam.
//!
//! Aggregates return events from their operations; an outer unit of work wraps them
//! in [`EventEnvelope`]s and hands them to an [`EventBus`] in the order they were
//! produced.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
