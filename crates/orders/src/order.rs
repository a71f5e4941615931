use core::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use labstock_core::{EquipmentId, OrderId};
use labstock_equipment::Equipment;

/// Purchase order status.
///
/// This is a closed set, but there is no transition validation: any status may
/// be overwritten with any other status, and delivered/cancelled orders are
/// not terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire/database spelling, matching the `orders.status` CHECK constraint.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InTransit => "IN_TRANSIT",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// An order still awaiting delivery.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InTransit)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "IN_TRANSIT" => Ok(OrderStatus::InTransit),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(ParseOrderStatusError(other.to_string())),
        }
    }
}

/// A persisted purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub equipment_id: EquipmentId,
    /// Equipment name snapshot taken at order time (denormalized).
    pub equipment_name: String,
    pub quantity: i64,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    /// Set only when the order is marked delivered.
    pub actual_delivery_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub supplier: String,
    pub total_cost: f64,
}

impl Order {
    /// Status ∈ {PENDING, IN_TRANSIT}.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// A purchase order that has not been persisted yet (no id assigned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub equipment_id: EquipmentId,
    pub equipment_name: String,
    pub quantity: i64,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    pub actual_delivery_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub supplier: String,
    pub total_cost: f64,
}

impl NewOrder {
    /// Place an order against an equipment record.
    ///
    /// Total cost is computed from the equipment's current unit price at order
    /// time, the order date defaults to today, and the supplier falls back to
    /// the equipment's supplier when the caller passes `None`. Placing an
    /// order does not reserve or consume stock; quantity only moves when the
    /// delivery completes.
    pub fn place(
        equipment: &Equipment,
        quantity: i64,
        expected_delivery_date: Option<NaiveDate>,
        supplier: Option<String>,
    ) -> Self {
        Self {
            equipment_id: equipment.id,
            equipment_name: equipment.name.clone(),
            quantity,
            order_date: Local::now().date_naive(),
            expected_delivery_date,
            actual_delivery_date: None,
            status: OrderStatus::Pending,
            supplier: supplier.unwrap_or_else(|| equipment.supplier.clone()),
            total_cost: quantity as f64 * equipment.unit_price,
        }
    }

    /// Attach a store-assigned id, yielding the persisted form.
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            equipment_id: self.equipment_id,
            equipment_name: self.equipment_name,
            quantity: self.quantity,
            order_date: self.order_date,
            expected_delivery_date: self.expected_delivery_date,
            actual_delivery_date: self.actual_delivery_date,
            status: self.status,
            supplier: self.supplier,
            total_cost: self.total_cost,
        }
    }
}
