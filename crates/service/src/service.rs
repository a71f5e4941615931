use chrono::{Local, NaiveDate};
use thiserror::Error;

use labstock_core::{EquipmentId, OrderId};
use labstock_equipment::Equipment;
use labstock_orders::{NewOrder, Order, OrderStatus};
use labstock_store::{Database, EquipmentStore, OrderStore, StoreError};

/// Failure of a service-level operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("equipment {0} not found")]
    EquipmentNotFound(EquipmentId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of the composite delivery operation.
///
/// Distinguishes which step failed; in every failure case the transaction is
/// rolled back, so the order is never left delivered with stale stock.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("equipment {0} not found")]
    EquipmentNotFound(EquipmentId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Façade over the two stores; the entire contract exposed to the
/// presentation layer.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
    equipment: EquipmentStore,
    orders: OrderStore,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        let equipment = EquipmentStore::new(&db);
        let orders = OrderStore::new(&db);
        Self {
            db,
            equipment,
            orders,
        }
    }

    pub fn equipment(&self) -> &EquipmentStore {
        &self.equipment
    }

    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    /// Equipment at or below its reorder threshold.
    pub async fn low_stock_alerts(&self) -> Result<Vec<Equipment>, StoreError> {
        self.equipment.low_stock().await
    }

    /// Equipment expiring within the alert window.
    pub async fn expiry_alerts(&self) -> Result<Vec<Equipment>, StoreError> {
        self.equipment.near_expiry().await
    }

    /// Place an order against an equipment record.
    ///
    /// Quantity is priced at the equipment's current unit price; stock is not
    /// reserved or consumed until the delivery completes.
    pub async fn place_order(
        &self,
        equipment_id: EquipmentId,
        quantity: i64,
        expected_delivery_date: Option<NaiveDate>,
        supplier: Option<String>,
    ) -> Result<Order, ServiceError> {
        let equipment = self
            .equipment
            .get(equipment_id)
            .await?
            .ok_or(ServiceError::EquipmentNotFound(equipment_id))?;

        let new_order = NewOrder::place(&equipment, quantity, expected_delivery_date, supplier);
        let id = self.orders.add(&new_order).await?;
        tracing::info!(order = %id, equipment = %equipment_id, quantity, "order placed");
        Ok(new_order.into_order(id))
    }

    /// Unconditional status overwrite on an order.
    pub async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, StoreError> {
        self.orders.set_status(id, status).await
    }

    /// Complete a delivery: mark the order DELIVERED (actual delivery date =
    /// today) and add the delivered quantity to the equipment's stock.
    ///
    /// Both writes run in one transaction; either both commit or neither does.
    pub async fn mark_order_delivered(
        &self,
        order_id: OrderId,
        equipment_id: EquipmentId,
        quantity: i64,
    ) -> Result<(), DeliveryError> {
        self.mark_order_delivered_on(order_id, equipment_id, quantity, Local::now().date_naive())
            .await
    }

    pub async fn mark_order_delivered_on(
        &self,
        order_id: OrderId,
        equipment_id: EquipmentId,
        quantity: i64,
        delivered_on: NaiveDate,
    ) -> Result<(), DeliveryError> {
        let mut tx = self.db.pool().begin().await.map_err(StoreError::from)?;

        // Dropping the transaction on any early return rolls both writes back.
        if !OrderStore::mark_delivered_in(&mut tx, order_id, delivered_on).await? {
            return Err(DeliveryError::OrderNotFound(order_id));
        }
        if !EquipmentStore::adjust_quantity_in(&mut tx, equipment_id, quantity).await? {
            return Err(DeliveryError::EquipmentNotFound(equipment_id));
        }

        tx.commit().await.map_err(StoreError::from)?;
        tracing::info!(order = %order_id, equipment = %equipment_id, quantity, "order delivered");
        Ok(())
    }

    pub async fn low_stock_count(&self) -> Result<usize, StoreError> {
        Ok(self.low_stock_alerts().await?.len())
    }

    pub async fn expiry_alert_count(&self) -> Result<usize, StoreError> {
        Ok(self.expiry_alerts().await?.len())
    }

    pub async fn active_order_count(&self) -> Result<usize, StoreError> {
        Ok(self.orders.active().await?.len())
    }

    /// Number of distinct equipment records.
    pub async fn total_equipment_types(&self) -> Result<usize, StoreError> {
        Ok(self.equipment.list().await?.len())
    }

    /// Sum of all stock quantities.
    pub async fn total_equipment_quantity(&self) -> Result<i64, StoreError> {
        Ok(self.equipment.list().await?.iter().map(|e| e.quantity).sum())
    }
}
