use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use agristock_core::Entity;
use agristock_products::Product;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    CriticalStock,
    Expired,
    Movement,
}

/// Operator-facing alert. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub date: DateTime<Utc>,
}

impl Alert {
    pub fn critical_stock(product: &Product, date: DateTime<Utc>) -> Self {
        Self {
            id: format!("critical-{}", product.id()),
            kind: AlertKind::CriticalStock,
            message: critical_stock_message(product),
            date,
        }
    }

    pub fn expired(product: &Product, date: DateTime<Utc>) -> Self {
        Self {
            id: format!("expired-{}", product.id()),
            kind: AlertKind::Expired,
            message: format!(
                "Expired: {} (batch {}) expired on {}.",
                product.name(),
                product.batch(),
                product.expiry_date()
            ),
            date,
        }
    }
}

pub(crate) fn critical_stock_message(product: &Product) -> String {
    format!(
        "Critical stock: {} at {} (min: {}).",
        product.name(),
        product.current_stock().normalize(),
        product.min_stock().normalize()
    )
}

/// Standing alerts for a product snapshot: one CRITICAL_STOCK per low-stock
/// product, then one EXPIRED per product past its expiry date.
pub fn stock_alerts(products: &[Product], today: NaiveDate, now: DateTime<Utc>) -> Vec<Alert> {
    let critical = products
        .iter()
        .filter(|p| p.is_low_stock())
        .map(|p| Alert::critical_stock(p, now));
    let expired = products
        .iter()
        .filter(|p| p.is_expired(today))
        .map(|p| Alert::expired(p, now));
    critical.chain(expired).collect()
}
