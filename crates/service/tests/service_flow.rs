//! End-to-end flows through the service boundary, against in-memory SQLite.

use chrono::{Duration, NaiveDate};

use labstock_core::{EquipmentId, OrderId};
use labstock_equipment::NewEquipment;
use labstock_orders::OrderStatus;
use labstock_service::{DeliveryError, InventoryService};
use labstock_store::Database;

async fn service() -> InventoryService {
    // Idempotent; makes store/service tracing visible under RUST_LOG.
    labstock_observability::init();

    let db = Database::in_memory().await.expect("in-memory database");
    InventoryService::new(db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn place_order_prices_at_current_unit_price() {
    let svc = service().await;
    let id = svc
        .equipment()
        .add(&NewEquipment::new("Centrifuge Tube (pack)", "Consumables", 12, 4, 100.0))
        .await
        .unwrap();

    let order = svc
        .place_order(id, 3, Some(date(2026, 9, 15)), None)
        .await
        .unwrap();

    assert_eq!(order.total_cost, 300.0);
    assert_eq!(order.equipment_name, "Centrifuge Tube (pack)");
    assert_eq!(order.status, OrderStatus::Pending);

    // Placing an order does not touch stock.
    let equipment = svc.equipment().get(id).await.unwrap().unwrap();
    assert_eq!(equipment.quantity, 12);
}

#[tokio::test]
async fn delivery_increments_stock_and_stamps_order() {
    let svc = service().await;
    let equipment_id = svc
        .equipment()
        .add(&NewEquipment::new("Nitrile Gloves (M)", "Consumables", 8, 20, 350.0))
        .await
        .unwrap();

    let order = svc
        .place_order(equipment_id, 30, Some(date(2026, 9, 1)), None)
        .await
        .unwrap();

    let delivered_on = date(2026, 8, 30);
    svc.mark_order_delivered_on(order.id, equipment_id, order.quantity, delivered_on)
        .await
        .unwrap();

    let equipment = svc.equipment().get(equipment_id).await.unwrap().unwrap();
    assert_eq!(equipment.quantity, 8 + 30);

    let order = svc.orders().get(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.actual_delivery_date, Some(delivered_on));
}

#[tokio::test]
async fn delivery_of_unknown_order_fails_without_side_effects() {
    let svc = service().await;
    let equipment_id = svc
        .equipment()
        .add(&NewEquipment::new("Beaker 500ml", "Glassware", 40, 12, 120.0))
        .await
        .unwrap();

    let err = svc
        .mark_order_delivered(OrderId::new(999), equipment_id, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::OrderNotFound(_)));

    let equipment = svc.equipment().get(equipment_id).await.unwrap().unwrap();
    assert_eq!(equipment.quantity, 40);
}

#[tokio::test]
async fn delivery_to_unknown_equipment_rolls_back_the_order_stamp() {
    let svc = service().await;
    let equipment_id = svc
        .equipment()
        .add(&NewEquipment::new("Agar Powder", "Reagents", 6, 4, 980.0))
        .await
        .unwrap();

    let order = svc
        .place_order(equipment_id, 2, None, None)
        .await
        .unwrap();

    let err = svc
        .mark_order_delivered(order.id, EquipmentId::new(999), 2)
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::EquipmentNotFound(_)));

    // The order status update must have been rolled back with it.
    let order = svc.orders().get(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.actual_delivery_date, None);
}

#[tokio::test]
async fn cancelling_a_pending_order_removes_it_from_active() {
    let svc = service().await;
    let equipment_id = svc
        .equipment()
        .add(&NewEquipment::new("Ethanol 95%", "Reagents", 3, 6, 640.0))
        .await
        .unwrap();

    let order = svc.place_order(equipment_id, 10, None, None).await.unwrap();
    assert_eq!(svc.active_order_count().await.unwrap(), 1);

    assert!(svc
        .set_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap());
    assert_eq!(svc.active_order_count().await.unwrap(), 0);
    assert!(svc.orders().active().await.unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_aggregates_derive_from_store_queries() {
    let svc = service().await;
    let today = chrono::Local::now().date_naive();

    svc.equipment()
        .add(&NewEquipment::new("Gloves", "Consumables", 8, 20, 350.0))
        .await
        .unwrap();
    svc.equipment()
        .add(
            &NewEquipment::new("Agar", "Reagents", 6, 4, 980.0)
                .with_expiry(today + Duration::days(10)),
        )
        .await
        .unwrap();
    svc.equipment()
        .add(&NewEquipment::new("Beakers", "Glassware", 42, 15, 120.0))
        .await
        .unwrap();

    assert_eq!(svc.total_equipment_types().await.unwrap(), 3);
    assert_eq!(svc.total_equipment_quantity().await.unwrap(), 8 + 6 + 42);
    assert_eq!(svc.low_stock_count().await.unwrap(), 1);
    assert_eq!(svc.expiry_alert_count().await.unwrap(), 1);
    assert_eq!(svc.active_order_count().await.unwrap(), 0);
}

#[tokio::test]
async fn place_order_against_missing_equipment_is_rejected() {
    let svc = service().await;
    let err = svc
        .place_order(EquipmentId::new(42), 1, None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        labstock_service::ServiceError::EquipmentNotFound(_)
    ));
}
