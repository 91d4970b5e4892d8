//! Dashboard statistics over a product snapshot.
//!
//! Recomputed from scratch on every read; nothing here is cached, so the
//! numbers can never drift from the stored stock.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use agristock_products::{Category, Product};

/// Stock total for one category (chart slice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}

/// Summary shown on the dashboard.
///
/// `total_volume` adds liters and kilograms together: it is a coarse "mix
/// volume", not a physical quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub product_count: usize,
    pub total_volume: Decimal,
    pub low_stock_count: usize,
    pub expired_count: usize,
    /// Only categories that have at least one product, in category order.
    pub category_breakdown: Vec<CategoryTotal>,
    /// Products at or below their minimum, in insertion order.
    pub low_stock_alerts: Vec<Product>,
}

impl DashboardStats {
    pub fn compute(products: &[Product], today: NaiveDate) -> Self {
        // Totals saturate rather than overflow; each stock is representable on
        // its own but their sum need not be.
        let mut by_category: BTreeMap<Category, Decimal> = BTreeMap::new();
        let mut total_volume = Decimal::ZERO;
        for p in products {
            let slot = by_category.entry(p.category()).or_insert(Decimal::ZERO);
            *slot = slot.saturating_add(p.current_stock());
            total_volume = total_volume.saturating_add(p.current_stock());
        }

        let low_stock_alerts: Vec<Product> =
            products.iter().filter(|p| p.is_low_stock()).cloned().collect();

        Self {
            product_count: products.len(),
            total_volume,
            low_stock_count: low_stock_alerts.len(),
            expired_count: products.iter().filter(|p| p.is_expired(today)).count(),
            category_breakdown: by_category
                .into_iter()
                .map(|(category, total)| CategoryTotal { category, total })
                .collect(),
            low_stock_alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agristock_core::{Entity, ProductId};
    use agristock_products::{NewProduct, Unit};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product(id: &str, category: Category, current: i64, min: i64, expiry: NaiveDate) -> Product {
        Product::register(
            ProductId::from(id),
            NewProduct {
                name: format!("Product {id}"),
                category,
                batch: format!("B-{id}"),
                expiry_date: expiry,
                unit: if category == Category::Insecticide { Unit::Kilograms } else { Unit::Liters },
                current_stock: Decimal::from(current),
                min_stock: Decimal::from(min),
            },
        )
        .unwrap()
    }

    fn snapshot() -> Vec<Product> {
        vec![
            product("1", Category::Herbicide, 500, 100, date(2025, 12, 31)),
            product("2", Category::Fungicide, 45, 50, date(2024, 11, 20)),
            product("3", Category::Insecticide, 200, 20, date(2026, 5, 15)),
            product("4", Category::Foliar, 1200, 200, date(2024, 8, 1)),
            product("5", Category::Adjuvant, 300, 50, date(2027, 1, 1)),
            product("6", Category::Herbicide, 10, 10, date(2027, 1, 1)),
        ]
    }

    #[test]
    fn totals_mix_units_together() {
        let stats = DashboardStats::compute(&snapshot(), date(2025, 1, 1));

        assert_eq!(stats.product_count, 6);
        assert_eq!(stats.total_volume, Decimal::from(2255));
    }

    #[test]
    fn low_stock_counts_products_at_or_below_minimum() {
        let stats = DashboardStats::compute(&snapshot(), date(2025, 1, 1));

        assert_eq!(stats.low_stock_count, 2);
        let ids: Vec<_> = stats.low_stock_alerts.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, vec!["2", "6"]);
    }

    #[test]
    fn expired_count_depends_on_today() {
        let products = snapshot();

        assert_eq!(DashboardStats::compute(&products, date(2024, 1, 1)).expired_count, 0);
        assert_eq!(DashboardStats::compute(&products, date(2025, 1, 1)).expired_count, 2);
        assert_eq!(DashboardStats::compute(&products, date(2026, 1, 1)).expired_count, 3);
    }

    #[test]
    fn breakdown_lists_present_categories_only() {
        let stats = DashboardStats::compute(&snapshot(), date(2025, 1, 1));

        let categories: Vec<_> = stats.category_breakdown.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Herbicide,
                Category::Fungicide,
                Category::Insecticide,
                Category::Foliar,
                Category::Adjuvant,
            ]
        );
        assert_eq!(
            stats.category_breakdown[0],
            CategoryTotal {
                category: Category::Herbicide,
                total: Decimal::from(510),
            }
        );
    }

    #[test]
    fn empty_snapshot_yields_zeroes() {
        let stats = DashboardStats::compute(&[], date(2025, 1, 1));

        assert_eq!(stats.product_count, 0);
        assert_eq!(stats.total_volume, Decimal::ZERO);
        assert!(stats.category_breakdown.is_empty());
        assert!(stats.low_stock_alerts.is_empty());
    }
}
