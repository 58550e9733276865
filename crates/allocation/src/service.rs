//! Application service: the unit of work around a single [`Product`].
//!
//! ```text
//! Command
//!   ↓
//! 1. Load the target product (by sku or by batch reference)
//!   ↓
//! 2. Execute the command (in-memory, produces events)
//!   ↓
//! 3. Save with an optimistic-concurrency check on `version_number`
//!   ↓
//! 4. Publish events to the bus, in the order they were produced
//! ```
//!
//! Events are published only after a successful save. A publish failure is reported
//! to the caller; the saved state stays saved.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;
use tracing::{debug, info, warn};

use stockalloc_core::{Aggregate, BatchRef, DomainError, ExpectedVersion, Sku};
use stockalloc_events::{EventBus, EventEnvelope};

use crate::commands::{AddBatch, Allocate, AllocationCommand, ChangeBatchQuantity, ProductLookup};
use crate::events::AllocationEvent;
use crate::order_line::OrderLine;
use crate::product::Product;

/// Aggregate type recorded on every published envelope.
pub const PRODUCT_AGGREGATE: &str = "product";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The stored product moved on since it was loaded (or already exists on add).
    #[error("concurrency conflict: {0}")]
    Concurrency(String),
    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Storage seam for products and their batches.
pub trait ProductRepository: Send + Sync {
    fn get(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError>;

    fn get_by_batchref(&self, reference: &BatchRef) -> Result<Option<Product>, RepositoryError>;

    /// Store a product that did not exist before.
    fn add(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Replace a stored product if its stored version matches `expected`.
    fn save(&self, product: &Product, expected: ExpectedVersion) -> Result<(), RepositoryError>;
}

/// In-memory product store.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<Sku, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|p| (p.sku().clone(), p))
            .collect();
        Self {
            products: RwLock::new(products),
        }
    }

    fn poisoned() -> RepositoryError {
        RepositoryError::Storage("lock poisoned".to_string())
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn get(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(products.get(sku).cloned())
    }

    fn get_by_batchref(&self, reference: &BatchRef) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(products
            .values()
            .find(|p| p.batch(reference).is_some())
            .cloned())
    }

    fn add(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().map_err(|_| Self::poisoned())?;
        if products.contains_key(product.sku()) {
            return Err(RepositoryError::Concurrency(format!(
                "product {} already exists",
                product.sku()
            )));
        }
        products.insert(product.sku().clone(), product.clone());
        Ok(())
    }

    fn save(&self, product: &Product, expected: ExpectedVersion) -> Result<(), RepositoryError> {
        let mut products = self.products.write().map_err(|_| Self::poisoned())?;
        let stored = products.get_mut(product.sku()).ok_or_else(|| {
            RepositoryError::Storage(format!("product {} was never added", product.sku()))
        })?;

        expected
            .check(stored.version_number())
            .map_err(|e| RepositoryError::Concurrency(e.to_string()))?;

        *stored = product.clone();
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The command broke a domain rule (unknown batch, bad quantity, ...).
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// No stored product matches the command's target.
    #[error("no product for {0}")]
    ProductNotFound(ProductLookup),
    /// Someone else saved the product first; reload and retry.
    #[error("concurrency conflict: {0}")]
    Concurrency(String),
    #[error("repository failure: {0}")]
    Repository(String),
    /// Publication failed after a successful save.
    #[error("publish failed: {0}")]
    Publish(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Concurrency(msg) => ServiceError::Concurrency(msg),
            RepositoryError::Storage(msg) => ServiceError::Repository(msg),
        }
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub sku: Sku,
    pub version_number: u64,
    pub events: Vec<EventEnvelope<AllocationEvent>>,
}

impl Dispatched {
    /// Batch chosen by an `Allocate` command, if it succeeded.
    pub fn allocated_batchref(&self) -> Option<&BatchRef> {
        self.events.iter().find_map(|e| match e.payload() {
            AllocationEvent::Allocated(allocated) => Some(&allocated.batchref),
            _ => None,
        })
    }
}

/// Unit of work over a [`ProductRepository`] and an [`EventBus`].
pub struct AllocationService<R, B> {
    repository: R,
    bus: B,
}

impl<R, B> AllocationService<R, B>
where
    R: ProductRepository,
    B: EventBus<EventEnvelope<AllocationEvent>>,
{
    pub fn new(repository: R, bus: B) -> Self {
        Self { repository, bus }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn dispatch(&self, command: AllocationCommand) -> Result<Dispatched, ServiceError> {
        let lookup = command.lookup();
        debug!(command = command.name(), target = %lookup, "dispatching allocation command");

        if let AllocationCommand::AddBatch(cmd) = &command {
            self.ensure_reference_unused(cmd)?;
        }

        let stored = match &lookup {
            ProductLookup::BySku(sku) => self.repository.get(sku)?,
            ProductLookup::ByBatchRef(reference) => self.repository.get_by_batchref(reference)?,
        };

        let (mut product, is_new) = match (stored, &command) {
            (Some(product), _) => (product, false),
            (None, AllocationCommand::AddBatch(cmd)) => {
                (Product::new(cmd.sku.clone(), Vec::new()), true)
            }
            (None, _) => return Err(ServiceError::ProductNotFound(lookup)),
        };

        let version_before = product.version_number();
        let events = product.execute(&command)?;

        if is_new {
            self.repository.add(&product)?;
        } else {
            self.repository
                .save(&product, ExpectedVersion::Exact(version_before))?;
        }

        log_outcome(&product, &events);

        let envelopes = EventEnvelope::wrap_all(
            PRODUCT_AGGREGATE,
            product.sku().as_str(),
            product.version_number(),
            events,
        );
        for envelope in &envelopes {
            self.bus
                .publish(envelope.clone())
                .map_err(|e| ServiceError::Publish(e.to_string()))?;
        }

        Ok(Dispatched {
            sku: product.sku().clone(),
            version_number: product.version_number(),
            events: envelopes,
        })
    }

    /// Batch references are unique across every product, not just within one.
    fn ensure_reference_unused(&self, cmd: &AddBatch) -> Result<(), ServiceError> {
        match self.repository.get_by_batchref(&cmd.reference)? {
            Some(owner) if owner.sku() != &cmd.sku => Err(DomainError::conflict(format!(
                "batch {} already belongs to sku {}",
                cmd.reference,
                owner.sku()
            ))
            .into()),
            _ => Ok(()),
        }
    }

    pub fn add_batch(&self, cmd: AddBatch) -> Result<Dispatched, ServiceError> {
        self.dispatch(cmd.into())
    }

    /// Allocate a line; `Ok(None)` means the SKU is out of stock.
    pub fn allocate(&self, line: OrderLine) -> Result<Option<BatchRef>, ServiceError> {
        let dispatched = self.dispatch(Allocate { line }.into())?;
        Ok(dispatched.allocated_batchref().cloned())
    }

    pub fn change_batch_quantity(
        &self,
        reference: BatchRef,
        qty: i64,
    ) -> Result<Dispatched, ServiceError> {
        self.dispatch(ChangeBatchQuantity { reference, qty }.into())
    }
}

fn log_outcome(product: &Product, events: &[AllocationEvent]) {
    let mut deallocated = 0usize;
    for event in events {
        match event {
            AllocationEvent::Allocated(e) => info!(
                sku = %e.sku,
                orderid = %e.orderid,
                qty = e.qty,
                batchref = %e.batchref,
                version = product.version_number(),
                "order line allocated"
            ),
            AllocationEvent::OutOfStock(e) => warn!(sku = %e.sku, "out of stock"),
            AllocationEvent::Deallocated(e) => {
                deallocated += 1;
                debug!(sku = %e.sku, orderid = %e.orderid, qty = e.qty, "order line deallocated");
            }
        }
    }
    if deallocated > 0 {
        warn!(sku = %product.sku(), deallocated, "batch shrank below its allocations");
    }
}
