//! Equipment persistence.

use chrono::{Duration, Local, NaiveDate};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use labstock_core::EquipmentId;
use labstock_equipment::{Equipment, NewEquipment, NEAR_EXPIRY_WINDOW_DAYS};

use crate::db::Database;
use crate::error::StoreError;

const COLUMNS: &str =
    "id, name, category, quantity, lower_limit, unit_price, expiry_date, location, supplier, date_added";

/// SQLite-backed equipment store.
///
/// Cheap to clone; every call re-queries the database.
#[derive(Debug, Clone)]
pub struct EquipmentStore {
    pool: SqlitePool,
}

impl EquipmentStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// All equipment, ordered by id ascending.
    pub async fn list(&self) -> Result<Vec<Equipment>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM equipments ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    pub async fn get(&self, id: EquipmentId) -> Result<Option<Equipment>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM equipments WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(from_row).transpose().map_err(StoreError::from)
    }

    /// Persist a new record and return its store-assigned id.
    pub async fn add(&self, equipment: &NewEquipment) -> Result<EquipmentId, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO equipments (
                name, category, quantity, lower_limit, unit_price,
                expiry_date, location, supplier, date_added
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&equipment.name)
        .bind(&equipment.category)
        .bind(equipment.quantity)
        .bind(equipment.lower_limit)
        .bind(equipment.unit_price)
        .bind(equipment.expiry_date)
        .bind(&equipment.location)
        .bind(&equipment.supplier)
        .bind(equipment.date_added)
        .execute(&self.pool)
        .await?;

        Ok(EquipmentId::new(result.last_insert_rowid()))
    }

    /// Full field replace by id. Returns whether any row matched.
    pub async fn update(&self, equipment: &Equipment) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE equipments
            SET name = ?1, category = ?2, quantity = ?3, lower_limit = ?4,
                unit_price = ?5, expiry_date = ?6, location = ?7, supplier = ?8,
                date_added = ?9
            WHERE id = ?10
            "#,
        )
        .bind(&equipment.name)
        .bind(&equipment.category)
        .bind(equipment.quantity)
        .bind(equipment.lower_limit)
        .bind(equipment.unit_price)
        .bind(equipment.expiry_date)
        .bind(&equipment.location)
        .bind(&equipment.supplier)
        .bind(equipment.date_added)
        .bind(equipment.id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: EquipmentId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM equipments WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records whose name or category contains `term`, case-insensitive,
    /// ordered by name.
    pub async fn search(&self, term: &str) -> Result<Vec<Equipment>, StoreError> {
        let pattern = format!("%{term}%");
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM equipments WHERE name LIKE ?1 OR category LIKE ?1 ORDER BY name"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    /// Records at or below their reorder threshold, lowest stock first.
    pub async fn low_stock(&self) -> Result<Vec<Equipment>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM equipments WHERE quantity <= lower_limit ORDER BY quantity"
        ))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    /// Records expiring within the alert window of the local calendar date.
    pub async fn near_expiry(&self) -> Result<Vec<Equipment>, StoreError> {
        self.near_expiry_on(Local::now().date_naive()).await
    }

    /// Records with a non-null expiry date ≤ `today` + 15 days, soonest first.
    pub async fn near_expiry_on(&self, today: NaiveDate) -> Result<Vec<Equipment>, StoreError> {
        let cutoff = today + Duration::days(NEAR_EXPIRY_WINDOW_DAYS);
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM equipments \
             WHERE expiry_date IS NOT NULL AND expiry_date <= ?1 ORDER BY expiry_date"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    /// Add `delta` to a record's quantity inside a caller-owned transaction.
    ///
    /// Used by the composite delivery operation; returns whether the row
    /// existed.
    pub async fn adjust_quantity_in(
        conn: &mut SqliteConnection,
        id: EquipmentId,
        delta: i64,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE equipments SET quantity = quantity + ?1 WHERE id = ?2")
            .bind(delta)
            .bind(id.as_i64())
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn from_row(row: &SqliteRow) -> Result<Equipment, sqlx::Error> {
    Ok(Equipment {
        id: EquipmentId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        quantity: row.try_get("quantity")?,
        lower_limit: row.try_get("lower_limit")?,
        unit_price: row.try_get("unit_price")?,
        expiry_date: row.try_get("expiry_date")?,
        location: row.try_get::<Option<String>, _>("location")?.unwrap_or_default(),
        supplier: row.try_get::<Option<String>, _>("supplier")?.unwrap_or_default(),
        date_added: row.try_get("date_added")?,
    })
}

fn collect(rows: Vec<SqliteRow>) -> Result<Vec<Equipment>, StoreError> {
    rows.iter()
        .map(from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)
}
