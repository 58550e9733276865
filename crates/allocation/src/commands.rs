use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockalloc_core::{BatchRef, Sku};

use crate::order_line::OrderLine;

/// How a command finds the product it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductLookup {
    BySku(Sku),
    ByBatchRef(BatchRef),
}

impl core::fmt::Display for ProductLookup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProductLookup::BySku(sku) => write!(f, "sku {sku}"),
            ProductLookup::ByBatchRef(reference) => write!(f, "batch {reference}"),
        }
    }
}

/// Command: AddBatch (a new purchase of stock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBatch {
    pub reference: BatchRef,
    pub sku: Sku,
    pub qty: i64,
    pub eta: Option<NaiveDate>,
}

/// Command: Allocate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocate {
    pub line: OrderLine,
}

/// Command: ChangeBatchQuantity (supplier changed a purchase order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatchQuantity {
    pub reference: BatchRef,
    pub qty: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationCommand {
    AddBatch(AddBatch),
    Allocate(Allocate),
    ChangeBatchQuantity(ChangeBatchQuantity),
}

impl AllocationCommand {
    pub fn lookup(&self) -> ProductLookup {
        match self {
            AllocationCommand::AddBatch(cmd) => ProductLookup::BySku(cmd.sku.clone()),
            AllocationCommand::Allocate(cmd) => ProductLookup::BySku(cmd.line.sku().clone()),
            AllocationCommand::ChangeBatchQuantity(cmd) => {
                ProductLookup::ByBatchRef(cmd.reference.clone())
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AllocationCommand::AddBatch(_) => "add_batch",
            AllocationCommand::Allocate(_) => "allocate",
            AllocationCommand::ChangeBatchQuantity(_) => "change_batch_quantity",
        }
    }
}

impl From<AddBatch> for AllocationCommand {
    fn from(cmd: AddBatch) -> Self {
        AllocationCommand::AddBatch(cmd)
    }
}

impl From<Allocate> for AllocationCommand {
    fn from(cmd: Allocate) -> Self {
        AllocationCommand::Allocate(cmd)
    }
}

impl From<ChangeBatchQuantity> for AllocationCommand {
    fn from(cmd: ChangeBatchQuantity) -> Self {
        AllocationCommand::ChangeBatchQuantity(cmd)
    }
}
