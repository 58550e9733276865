//! Allocation domain module.
//!
//! Decides which purchased batch of stock satisfies a customer's order line,
//! implemented as deterministic in-memory domain logic. Storage and event transport
//! sit behind the traits in [`service`].

pub mod batch;
pub mod commands;
pub mod events;
pub mod order_line;
pub mod product;
pub mod service;

pub use batch::{Batch, BatchAllocation, allocation_priority};
pub use commands::{AddBatch, Allocate, AllocationCommand, ChangeBatchQuantity, ProductLookup};
pub use events::{Allocated, AllocationEvent, Deallocated, OutOfStock};
pub use order_line::OrderLine;
pub use product::{Allocation, Product};
pub use service::{
    AllocationService, Dispatched, InMemoryProductRepository, ProductRepository, RepositoryError,
    ServiceError,
};
