use stockalloc_core::{Aggregate, AggregateRoot, BatchRef, DomainError, DomainResult, Sku};

use crate::batch::{Batch, allocation_priority};
use crate::commands::AllocationCommand;
use crate::events::{Allocated, AllocationEvent, Deallocated, OutOfStock};
use crate::order_line::OrderLine;

/// Outcome of [`Product::allocate`]: the chosen batch (if any) plus the produced events.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    batchref: Option<BatchRef>,
    events: Vec<AllocationEvent>,
}

impl Allocation {
    /// The batch the line went to, or `None` when the SKU is out of stock.
    pub fn batchref(&self) -> Option<&BatchRef> {
        self.batchref.as_ref()
    }

    pub fn events(&self) -> &[AllocationEvent] {
        &self.events
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.batchref.is_none()
    }

    pub fn into_parts(self) -> (Option<BatchRef>, Vec<AllocationEvent>) {
        (self.batchref, self.events)
    }
}

/// Aggregate root: Product (every batch of one SKU).
///
/// `version_number` moves by exactly one per successful allocation and nothing else.
#[derive(Debug, Clone)]
pub struct Product {
    sku: Sku,
    batches: Vec<Batch>,
    version_number: u64,
}

impl Product {
    /// Batches are trusted to share `sku`; use [`Product::add_batch`] for checked insertion.
    pub fn new(sku: Sku, batches: Vec<Batch>) -> Self {
        Self::with_version(sku, batches, 0)
    }

    /// Rebuild a product from persisted state.
    pub fn with_version(sku: Sku, batches: Vec<Batch>, version_number: u64) -> Self {
        Self {
            sku,
            batches,
            version_number,
        }
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn batch(&self, reference: &BatchRef) -> Option<&Batch> {
        self.batches.iter().find(|b| b.reference() == reference)
    }

    pub fn version_number(&self) -> u64 {
        self.version_number
    }

    pub fn add_batch(&mut self, batch: Batch) -> DomainResult<()> {
        if batch.sku() != &self.sku {
            return Err(DomainError::validation(format!(
                "batch {} is for sku {}, not {}",
                batch.reference(),
                batch.sku(),
                self.sku
            )));
        }
        if self.batch(batch.reference()).is_some() {
            return Err(DomainError::conflict(format!(
                "batch {} already exists",
                batch.reference()
            )));
        }
        self.batches.push(batch);
        Ok(())
    }

    /// Allocate `line` to the preferred eligible batch.
    ///
    /// Running out of stock is a normal outcome: the result carries `None` and a
    /// single `OutOfStock` event.
    pub fn allocate(&mut self, line: &OrderLine) -> Allocation {
        // `min_by` keeps the first of equal candidates, same as a stable sort.
        let chosen = self
            .batches
            .iter()
            .enumerate()
            .filter(|(_, batch)| batch.can_allocate(line))
            .min_by(|(_, a), (_, b)| allocation_priority(a, b))
            .map(|(idx, _)| idx);

        if let Some(idx) = chosen {
            let batch = &mut self.batches[idx];
            if batch.allocate(line).is_allocated() {
                let batchref = batch.reference().clone();
                self.version_number += 1;
                return Allocation {
                    batchref: Some(batchref.clone()),
                    events: vec![AllocationEvent::Allocated(Allocated::new(line, batchref))],
                };
            }
        }

        Allocation {
            batchref: None,
            events: vec![AllocationEvent::OutOfStock(OutOfStock {
                sku: line.sku().clone(),
            })],
        }
    }

    /// Overwrite a batch's purchased quantity, releasing allocations until its
    /// available quantity is non-negative again.
    ///
    /// Returns one `Deallocated` event per released line, in release order.
    pub fn change_batch_quantity(
        &mut self,
        reference: &BatchRef,
        qty: i64,
    ) -> DomainResult<Vec<AllocationEvent>> {
        let batch = self
            .batches
            .iter_mut()
            .find(|b| b.reference() == reference)
            .ok_or_else(|| DomainError::not_found(format!("batch {reference}")))?;

        if qty < 0 {
            return Err(DomainError::validation("purchased quantity cannot be negative"));
        }

        batch.set_purchased_quantity(qty);

        let mut events = Vec::new();
        while batch.available_quantity() < 0 {
            let Ok(line) = batch.deallocate_one() else {
                break;
            };
            events.push(AllocationEvent::Deallocated(Deallocated::from(line)));
        }
        Ok(events)
    }
}

impl AggregateRoot for Product {
    type Id = Sku;

    fn id(&self) -> &Self::Id {
        &self.sku
    }

    fn version(&self) -> u64 {
        self.version_number
    }
}

impl Aggregate for Product {
    type Command = AllocationCommand;
    type Event = AllocationEvent;
    type Error = DomainError;

    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AllocationCommand::AddBatch(cmd) => {
                let batch = Batch::new(cmd.reference.clone(), cmd.sku.clone(), cmd.qty, cmd.eta)?;
                self.add_batch(batch)?;
                Ok(Vec::new())
            }
            AllocationCommand::Allocate(cmd) => {
                let (_, events) = self.allocate(&cmd.line).into_parts();
                Ok(events)
            }
            AllocationCommand::ChangeBatchQuantity(cmd) => {
                self.change_batch_quantity(&cmd.reference, cmd.qty)
            }
        }
    }
}
