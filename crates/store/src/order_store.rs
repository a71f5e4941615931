//! Purchase order persistence.

use chrono::{Local, NaiveDate};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use labstock_core::OrderId;
use labstock_orders::{NewOrder, Order, OrderStatus};

use crate::db::Database;
use crate::error::StoreError;

const COLUMNS: &str = "id, equipment_id, equipment_name, quantity, order_date, \
                       expected_delivery_date, actual_delivery_date, status, supplier, total_cost";

/// SQLite-backed order store.
///
/// Cheap to clone; every call re-queries the database.
#[derive(Debug, Clone)]
pub struct OrderStore {
    pool: SqlitePool,
}

impl OrderStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// All orders, newest order date first.
    pub async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM orders ORDER BY order_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    /// Orders still awaiting delivery, soonest expected delivery first.
    pub async fn active(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM orders \
             WHERE status IN ('PENDING', 'IN_TRANSIT') ORDER BY expected_delivery_date"
        ))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(from_row).transpose().map_err(StoreError::from)
    }

    /// Persist a new order and return its store-assigned id.
    pub async fn add(&self, order: &NewOrder) -> Result<OrderId, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                equipment_id, equipment_name, quantity, order_date,
                expected_delivery_date, actual_delivery_date, status, supplier, total_cost
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(order.equipment_id.as_i64())
        .bind(&order.equipment_name)
        .bind(order.quantity)
        .bind(order.order_date)
        .bind(order.expected_delivery_date)
        .bind(order.actual_delivery_date)
        .bind(order.status.as_str())
        .bind(&order.supplier)
        .bind(order.total_cost)
        .execute(&self.pool)
        .await?;

        Ok(OrderId::new(result.last_insert_rowid()))
    }

    /// Full field replace by id. Returns whether any row matched.
    pub async fn update(&self, order: &Order) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET equipment_id = ?1, equipment_name = ?2, quantity = ?3, order_date = ?4,
                expected_delivery_date = ?5, actual_delivery_date = ?6, status = ?7,
                supplier = ?8, total_cost = ?9
            WHERE id = ?10
            "#,
        )
        .bind(order.equipment_id.as_i64())
        .bind(&order.equipment_name)
        .bind(order.quantity)
        .bind(order.order_date)
        .bind(order.expected_delivery_date)
        .bind(order.actual_delivery_date)
        .bind(order.status.as_str())
        .bind(&order.supplier)
        .bind(order.total_cost)
        .bind(order.id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: OrderId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Unconditional status overwrite; no transition validation.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set status DELIVERED and stamp today's date as the actual delivery
    /// date, regardless of the current status.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<bool, StoreError> {
        self.mark_delivered_on(id, Local::now().date_naive()).await
    }

    pub async fn mark_delivered_on(
        &self,
        id: OrderId,
        delivered_on: NaiveDate,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::mark_delivered_in(&mut conn, id, delivered_on).await
    }

    /// Delivery stamp inside a caller-owned transaction.
    ///
    /// Used by the composite delivery operation; returns whether the row
    /// existed.
    pub async fn mark_delivered_in(
        conn: &mut SqliteConnection,
        id: OrderId,
        delivered_on: NaiveDate,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'DELIVERED', actual_delivery_date = ?1 WHERE id = ?2",
        )
        .bind(delivered_on)
        .bind(id.as_i64())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn from_row(row: &SqliteRow) -> Result<Order, sqlx::Error> {
    // The status column is plain TEXT; parse the wire spelling here so the
    // domain crate stays free of storage concerns.
    let status = row
        .try_get::<String, _>("status")?
        .parse::<OrderStatus>()
        .map_err(|err| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(err),
        })?;

    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        equipment_id: labstock_core::EquipmentId::new(row.try_get("equipment_id")?),
        equipment_name: row.try_get("equipment_name")?,
        quantity: row.try_get("quantity")?,
        order_date: row.try_get("order_date")?,
        expected_delivery_date: row.try_get("expected_delivery_date")?,
        actual_delivery_date: row.try_get("actual_delivery_date")?,
        status,
        supplier: row.try_get("supplier")?,
        total_cost: row.try_get("total_cost")?,
    })
}

fn collect(rows: Vec<SqliteRow>) -> Result<Vec<Order>, StoreError> {
    rows.iter()
        .map(from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)
}
