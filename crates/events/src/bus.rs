//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is the seam between an aggregate's produced events and whatever reacts
//! to them (notifications, re-allocation of freed order lines, read models).
//!
//! The contract is deliberately small:
//!
//! - **Ordered per publisher**: a subscriber sees one publisher's messages in publish order
//! - **Broadcast**: every subscriber gets its own copy
//! - **No persistence**: the bus distributes, it does not store
//!
//! Transports with weaker guarantees (brokers with redelivery) need idempotent consumers.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to an event stream.
///
/// ```ignore
/// let subscription = bus.subscribe();
///
/// service.change_batch_quantity(reference, qty)?;
/// for envelope in subscription.drain() {
///     reallocate(envelope)?;
/// }
/// ```
///
/// Subscriptions are meant for a single consuming thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Drain every message currently queued, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// ```text
/// Command → Aggregate (events) → Repository (save) → Event Bus (publish) → Subscribers
/// ```
///
/// Events are published only after the aggregate state is saved, so a publish
/// failure never announces a change that was not persisted.
///
/// Implementations must be `Send + Sync`; several threads may publish at once.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
