//! Database handle: connection setup, schema bootstrap, sample-data seeding.

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::error::StoreError;
use crate::seed;

/// Explicitly owned SQLite handle, opened at startup and passed to the stores.
///
/// The pool is capped at a single connection, which matches the original
/// shared-connection design and serializes writers; the composite delivery
/// operation additionally runs inside one transaction (see the service crate).
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database file and bootstrap the schema.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        // The equipment reference on orders is declared but not enforced; a
        // delivered order outlives its equipment record, and deleting
        // equipment with open orders is allowed.
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open SQLite database at {path:?}"))?;

        Self::create_tables(&pool).await?;
        tracing::info!(path = %path.display(), "database opened");
        Ok(Self { pool })
    }

    /// Open an in-memory database (used by the test suites).
    ///
    /// The single connection must never be recycled, or the data vanishes.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("failed to parse in-memory SQLite options")?
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory SQLite database")?;

        Self::create_tables(&pool).await?;
        Ok(Self { pool })
    }

    /// The underlying pool. Stores clone this cheaply.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_tables(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS equipments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                category    TEXT NOT NULL,
                quantity    INTEGER NOT NULL,
                lower_limit INTEGER NOT NULL,
                unit_price  REAL NOT NULL,
                expiry_date DATE,
                location    TEXT,
                supplier    TEXT,
                date_added  DATE DEFAULT CURRENT_DATE
            )
            "#,
        )
        .execute(pool)
        .await
        .context("failed to create equipments table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id                     INTEGER PRIMARY KEY AUTOINCREMENT,
                equipment_id           INTEGER NOT NULL,
                equipment_name         TEXT NOT NULL,
                quantity               INTEGER NOT NULL,
                order_date             DATE DEFAULT CURRENT_DATE,
                expected_delivery_date DATE,
                actual_delivery_date   DATE,
                status                 TEXT NOT NULL
                    CHECK(status IN ('PENDING', 'IN_TRANSIT', 'DELIVERED', 'CANCELLED')),
                supplier               TEXT NOT NULL,
                total_cost             REAL,
                FOREIGN KEY (equipment_id) REFERENCES equipments(id)
            )
            "#,
        )
        .execute(pool)
        .await
        .context("failed to create orders table")?;

        Ok(())
    }

    /// Whether the equipments table has no rows.
    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM equipments")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count").map_err(StoreError::from)?;
        Ok(count == 0)
    }

    /// Execute a semicolon-delimited SQL script, best-effort.
    ///
    /// Comment lines (`--`) and blank lines are skipped; each statement runs
    /// independently and individual failures are logged and skipped. Returns
    /// the number of statements applied.
    pub async fn seed(&self, script: &str) -> usize {
        let mut applied = 0;
        for stmt in seed::statements(script) {
            match sqlx::query(&stmt).execute(&self.pool).await {
                Ok(_) => applied += 1,
                Err(err) => {
                    tracing::warn!(error = %err, statement = %stmt, "seed statement skipped");
                }
            }
        }
        tracing::info!(applied, "seed script executed");
        applied
    }

    /// Run `script` only when the database holds no equipment yet (first run).
    ///
    /// Returns whether seeding ran.
    pub async fn seed_if_empty(&self, script: &str) -> Result<bool, StoreError> {
        if !self.is_empty().await? {
            tracing::debug!("database already contains data, skipping seed");
            return Ok(false);
        }
        self.seed(script).await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_database_is_empty() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn seed_if_empty_runs_once() {
        let db = Database::in_memory().await.unwrap();

        let seeded = db.seed_if_empty(crate::seed::SAMPLE_DATA).await.unwrap();
        assert!(seeded);
        assert!(!db.is_empty().await.unwrap());

        // Second run is a no-op.
        let seeded = db.seed_if_empty(crate::seed::SAMPLE_DATA).await.unwrap();
        assert!(!seeded);
    }

    #[tokio::test]
    async fn equipment_reference_on_orders_is_not_enforced() {
        use labstock_core::EquipmentId;
        use labstock_equipment::NewEquipment;
        use labstock_orders::{NewOrder, OrderStatus};

        use crate::{EquipmentStore, OrderStore};

        let db = Database::in_memory().await.unwrap();
        let equipment = EquipmentStore::new(&db);
        let orders = OrderStore::new(&db);

        let id = equipment
            .add(&NewEquipment::new("Beaker 500ml", "Glassware", 40, 12, 120.0))
            .await
            .unwrap();
        let order = NewOrder {
            equipment_id: id,
            equipment_name: "Beaker 500ml".to_string(),
            quantity: 5,
            order_date: chrono::NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            expected_delivery_date: None,
            actual_delivery_date: None,
            status: OrderStatus::Pending,
            supplier: "LabMart".to_string(),
            total_cost: 600.0,
        };
        let order_id = orders.add(&order).await.unwrap();

        // Deleting equipment that still has orders succeeds, and orders
        // against ids that never existed are accepted.
        assert!(equipment.delete(id).await.unwrap());
        assert!(orders.get(order_id).await.unwrap().is_some());

        let mut dangling = order;
        dangling.equipment_id = EquipmentId::new(999);
        assert!(orders.add(&dangling).await.is_ok());
    }

    #[tokio::test]
    async fn check_violations_surface_as_constraint_errors() {
        let db = Database::in_memory().await.unwrap();

        // The status CHECK is the one constraint the typed API cannot hit.
        let err = sqlx::query(
            "INSERT INTO orders (equipment_id, equipment_name, quantity, status, supplier) \
             VALUES (1, 'Beaker 500ml', 2, 'SHIPPED', 'LabMart')",
        )
        .execute(db.pool())
        .await
        .map_err(StoreError::from)
        .unwrap_err();

        assert!(matches!(err, StoreError::Constraint(_)));

        let err = sqlx::query("INSERT INTO equipments (name, category, quantity, lower_limit, unit_price) \
             VALUES (NULL, 'Glassware', 1, 1, 10.0)")
            .execute(db.pool())
            .await
            .map_err(StoreError::from)
            .unwrap_err();

        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn seed_skips_failing_statements() {
        let db = Database::in_memory().await.unwrap();

        let script = r#"
            -- one bad statement in the middle must not abort the rest
            INSERT INTO equipments (name, category, quantity, lower_limit, unit_price)
                VALUES ('Beaker', 'Glassware', 10, 2, 50.0);
            INSERT INTO no_such_table VALUES (1);
            INSERT INTO equipments (name, category, quantity, lower_limit, unit_price)
                VALUES ('Flask', 'Glassware', 4, 2, 80.0);
        "#;

        assert_eq!(db.seed(script).await, 2);
    }
}
