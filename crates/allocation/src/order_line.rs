use serde::{Deserialize, Serialize};

use stockalloc_core::{DomainError, DomainResult, OrderId, Sku, ValueObject};

/// Value object: a customer's request for `qty` units of one SKU under one order.
///
/// Equality and hashing cover all three fields, so two lines for the same order
/// and SKU with different quantities are distinct lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderLine {
    orderid: OrderId,
    sku: Sku,
    qty: i64,
}

impl OrderLine {
    pub fn new(orderid: OrderId, sku: Sku, qty: i64) -> DomainResult<Self> {
        if qty <= 0 {
            return Err(DomainError::validation("order line qty must be positive"));
        }
        Ok(Self { orderid, sku, qty })
    }

    pub fn orderid(&self) -> &OrderId {
        &self.orderid
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn qty(&self) -> i64 {
        self.qty
    }
}

impl ValueObject for OrderLine {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn line(orderid: &str, sku: &str, qty: i64) -> OrderLine {
        OrderLine::new(OrderId::new(orderid).unwrap(), Sku::new(sku).unwrap(), qty).unwrap()
    }

    #[test]
    fn lines_with_equal_fields_are_interchangeable() {
        let mut set = HashSet::new();
        set.insert(line("order-1", "RED-CHAIR", 10));
        set.insert(line("order-1", "RED-CHAIR", 10));

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn qty_is_part_of_identity() {
        assert_ne!(line("order-1", "RED-CHAIR", 10), line("order-1", "RED-CHAIR", 11));
    }

    #[test]
    fn rejects_non_positive_qty() {
        let err = OrderLine::new(
            OrderId::new("order-1").unwrap(),
            Sku::new("RED-CHAIR").unwrap(),
            0,
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }
}
