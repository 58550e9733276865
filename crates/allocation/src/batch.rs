use core::cmp::Ordering;

use chrono::NaiveDate;

use stockalloc_core::{BatchRef, DomainError, DomainResult, Entity, Sku};

use crate::order_line::OrderLine;

/// Result of offering an order line to a batch.
#[must_use]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BatchAllocation {
    /// The line is allocated to the batch (including when it already was).
    Allocated,
    /// The batch cannot take the line (SKU mismatch or not enough stock); nothing changed.
    Rejected,
}

impl BatchAllocation {
    pub fn is_allocated(self) -> bool {
        matches!(self, BatchAllocation::Allocated)
    }
}

/// Entity: a discrete purchased quantity of one SKU.
///
/// Allocations keep insertion order and hold no duplicates. Equality and hashing
/// go through `reference` only.
#[derive(Debug, Clone)]
pub struct Batch {
    reference: BatchRef,
    sku: Sku,
    eta: Option<NaiveDate>,
    purchased_quantity: i64,
    allocations: Vec<OrderLine>,
}

impl Batch {
    /// A fresh batch with no allocations. `eta: None` means the stock is in hand.
    pub fn new(
        reference: BatchRef,
        sku: Sku,
        purchased_quantity: i64,
        eta: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        if purchased_quantity < 0 {
            return Err(DomainError::validation("purchased quantity cannot be negative"));
        }
        Ok(Self {
            reference,
            sku,
            eta,
            purchased_quantity,
            allocations: Vec::new(),
        })
    }

    pub fn reference(&self) -> &BatchRef {
        &self.reference
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn eta(&self) -> Option<NaiveDate> {
        self.eta
    }

    pub fn purchased_quantity(&self) -> i64 {
        self.purchased_quantity
    }

    /// Allocated lines, oldest first.
    pub fn allocations(&self) -> &[OrderLine] {
        &self.allocations
    }

    pub fn allocated_quantity(&self) -> i64 {
        self.allocations.iter().map(OrderLine::qty).sum()
    }

    /// Purchased minus allocated. Negative only between an external quantity
    /// reduction and the deallocation that follows it.
    pub fn available_quantity(&self) -> i64 {
        self.purchased_quantity - self.allocated_quantity()
    }

    pub fn is_allocated(&self, line: &OrderLine) -> bool {
        self.allocations.contains(line)
    }

    pub fn can_allocate(&self, line: &OrderLine) -> bool {
        self.sku == *line.sku() && self.available_quantity() >= line.qty()
    }

    pub fn allocate(&mut self, line: &OrderLine) -> BatchAllocation {
        if !self.can_allocate(line) {
            return BatchAllocation::Rejected;
        }
        if !self.is_allocated(line) {
            self.allocations.push(line.clone());
        }
        BatchAllocation::Allocated
    }

    /// Remove and return the most recently allocated line.
    pub fn deallocate_one(&mut self) -> DomainResult<OrderLine> {
        self.allocations.pop().ok_or_else(|| {
            DomainError::invariant(format!("batch {} has no allocations", self.reference))
        })
    }

    pub(crate) fn set_purchased_quantity(&mut self, qty: i64) {
        self.purchased_quantity = qty;
    }
}

impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Batch {}

impl core::hash::Hash for Batch {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl Entity for Batch {
    type Id = BatchRef;

    fn id(&self) -> &Self::Id {
        &self.reference
    }
}

/// Allocation preference between two batches, for use with a stable sort.
///
/// In-stock batches (no eta) come before shipments; among shipments the earlier
/// eta comes first. Anything else compares `Equal`, so callers keep their own order.
pub fn allocation_priority(a: &Batch, b: &Batch) -> Ordering {
    match (a.eta, b.eta) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}
