use serde::{Deserialize, Serialize};

use stockalloc_core::{BatchRef, OrderId, Sku};
use stockalloc_events::Event;

use crate::order_line::OrderLine;

/// Event: an order line was allocated to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocated {
    pub orderid: OrderId,
    pub sku: Sku,
    pub qty: i64,
    pub batchref: BatchRef,
}

/// Event: no batch of the SKU could take an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfStock {
    pub sku: Sku,
}

/// Event: an order line was released after its batch shrank.
///
/// Subscribers are expected to re-allocate the line elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deallocated {
    pub orderid: OrderId,
    pub sku: Sku,
    pub qty: i64,
}

impl Allocated {
    pub(crate) fn new(line: &OrderLine, batchref: BatchRef) -> Self {
        Self {
            orderid: line.orderid().clone(),
            sku: line.sku().clone(),
            qty: line.qty(),
            batchref,
        }
    }
}

impl From<OrderLine> for Deallocated {
    fn from(line: OrderLine) -> Self {
        Self {
            orderid: line.orderid().clone(),
            sku: line.sku().clone(),
            qty: line.qty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AllocationEvent {
    Allocated(Allocated),
    OutOfStock(OutOfStock),
    Deallocated(Deallocated),
}

impl Event for AllocationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AllocationEvent::Allocated(_) => "allocation.line.allocated",
            AllocationEvent::OutOfStock(_) => "allocation.product.out_of_stock",
            AllocationEvent::Deallocated(_) => "allocation.line.deallocated",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = AllocationEvent::Allocated(Allocated {
            orderid: OrderId::new("order-1").unwrap(),
            sku: Sku::new("SMALL-TABLE").unwrap(),
            qty: 2,
            batchref: BatchRef::new("batch-001").unwrap(),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "allocated",
                "orderid": "order-1",
                "sku": "SMALL-TABLE",
                "qty": 2,
                "batchref": "batch-001",
            })
        );

        let back: AllocationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn event_types_are_stable() {
        let out = AllocationEvent::OutOfStock(OutOfStock {
            sku: Sku::new("SMALL-TABLE").unwrap(),
        });
        assert_eq!(out.event_type(), "allocation.product.out_of_stock");
        assert_eq!(out.version(), 1);
    }
}
