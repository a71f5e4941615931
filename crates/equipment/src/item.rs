use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use labstock_core::EquipmentId;

/// An expiry date within this many days of today counts as a near-expiry alert
/// (inclusive).
pub const NEAR_EXPIRY_WINDOW_DAYS: i64 = 15;

/// A persisted equipment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    /// Reorder threshold: stock at or below this level is a low-stock alert.
    pub lower_limit: i64,
    pub unit_price: f64,
    pub expiry_date: Option<NaiveDate>,
    pub location: String,
    pub supplier: String,
    pub date_added: NaiveDate,
}

/// An equipment record that has not been persisted yet (no id assigned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEquipment {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub lower_limit: i64,
    pub unit_price: f64,
    pub expiry_date: Option<NaiveDate>,
    pub location: String,
    pub supplier: String,
    pub date_added: NaiveDate,
}

impl NewEquipment {
    /// Build a record dated today.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: i64,
        lower_limit: i64,
        unit_price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity,
            lower_limit,
            unit_price,
            expiry_date: None,
            location: String::new(),
            supplier: String::new(),
            date_added: Local::now().date_naive(),
        }
    }

    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = supplier.into();
        self
    }

    /// Attach a store-assigned id, yielding the persisted form.
    pub fn into_equipment(self, id: EquipmentId) -> Equipment {
        Equipment {
            id,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            lower_limit: self.lower_limit,
            unit_price: self.unit_price,
            expiry_date: self.expiry_date,
            location: self.location,
            supplier: self.supplier,
            date_added: self.date_added,
        }
    }
}

impl Equipment {
    /// Stock at or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.lower_limit
    }

    /// Expiry date within [`NEAR_EXPIRY_WINDOW_DAYS`] of `today`, inclusive.
    ///
    /// Records without an expiry date never expire.
    pub fn is_near_expiry_on(&self, today: NaiveDate) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry <= today + Duration::days(NEAR_EXPIRY_WINDOW_DAYS),
            None => false,
        }
    }

    /// [`Self::is_near_expiry_on`] against the local calendar date.
    pub fn is_near_expiry(&self) -> bool {
        self.is_near_expiry_on(Local::now().date_naive())
    }

    /// Days from `today` until expiry; negative once expired, `None` when the
    /// record has no expiry date.
    pub fn days_until_expiry_on(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date.map(|expiry| (expiry - today).num_days())
    }

    /// [`Self::days_until_expiry_on`] against the local calendar date.
    pub fn days_until_expiry(&self) -> Option<i64> {
        self.days_until_expiry_on(Local::now().date_naive())
    }
}
