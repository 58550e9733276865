use std::sync::Arc;

use chrono::NaiveDate;

use stockalloc_allocation::{
    AddBatch, AllocationEvent, AllocationService, InMemoryProductRepository, OrderLine,
    ProductRepository, ServiceError,
};
use stockalloc_core::{BatchRef, DomainError, OrderId, Sku};
use stockalloc_events::{EventBus, EventEnvelope, InMemoryEventBus};

type Bus = Arc<InMemoryEventBus<EventEnvelope<AllocationEvent>>>;

fn sku(s: &str) -> Sku {
    Sku::new(s).unwrap()
}

fn bref(s: &str) -> BatchRef {
    BatchRef::new(s).unwrap()
}

fn line(orderid: &str, sku_name: &str, qty: i64) -> OrderLine {
    OrderLine::new(OrderId::new(orderid).unwrap(), sku(sku_name), qty).unwrap()
}

fn setup() -> AllocationService<InMemoryProductRepository, Bus> {
    stockalloc_observability::init();
    AllocationService::new(InMemoryProductRepository::new(), Arc::new(InMemoryEventBus::new()))
}

fn add(
    service: &AllocationService<InMemoryProductRepository, Bus>,
    reference: &str,
    sku_name: &str,
    qty: i64,
    eta: Option<NaiveDate>,
) {
    service
        .add_batch(AddBatch {
            reference: bref(reference),
            sku: sku(sku_name),
            qty,
            eta,
        })
        .unwrap();
}

#[test]
fn deallocated_lines_can_be_reallocated_by_a_subscriber() {
    let service = setup();
    let subscription = service.bus().subscribe();

    add(&service, "in-stock", "VINTAGE-SOFA", 10, None);
    add(&service, "shipment", "VINTAGE-SOFA", 50, NaiveDate::from_ymd_opt(2025, 6, 1));

    assert_eq!(service.allocate(line("o1", "VINTAGE-SOFA", 6)).unwrap(), Some(bref("in-stock")));
    assert_eq!(service.allocate(line("o2", "VINTAGE-SOFA", 4)).unwrap(), Some(bref("in-stock")));
    subscription.drain();

    service.change_batch_quantity(bref("in-stock"), 7).unwrap();

    // React to each deallocation the way an external handler would.
    for envelope in subscription.drain() {
        if let AllocationEvent::Deallocated(d) = envelope.payload() {
            let again = line(d.orderid.as_str(), d.sku.as_str(), d.qty);
            assert_eq!(service.allocate(again).unwrap(), Some(bref("shipment")));
        }
    }

    let product = service.repository().get(&sku("VINTAGE-SOFA")).unwrap().unwrap();
    let in_stock = product.batch(&bref("in-stock")).unwrap();
    let shipment = product.batch(&bref("shipment")).unwrap();
    assert_eq!(in_stock.available_quantity(), 1);
    assert_eq!(shipment.available_quantity(), 46);
    assert_eq!(product.version_number(), 3);
}

#[test]
fn events_are_published_in_production_order() {
    let service = setup();
    let subscription = service.bus().subscribe();

    add(&service, "b1", "PLAIN-MUG", 5, None);
    service.allocate(line("o1", "PLAIN-MUG", 5)).unwrap();
    service.allocate(line("o2", "PLAIN-MUG", 1)).unwrap();

    let types: Vec<_> = subscription
        .drain()
        .iter()
        .map(|e| e.event_type().to_string())
        .collect();
    assert_eq!(
        types,
        vec!["allocation.line.allocated", "allocation.product.out_of_stock"]
    );
}

#[test]
fn invalid_quantity_change_surfaces_domain_error() {
    let service = setup();
    add(&service, "b1", "PLAIN-MUG", 5, None);

    let err = service.change_batch_quantity(bref("b1"), -3).unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
}
