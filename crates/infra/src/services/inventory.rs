use chrono::{DateTime, NaiveDate, Utc};

use agristock_core::{Entity, ExpectedVersion, ProductId};
use agristock_fields::Field;
use agristock_inventory::{Alert, DashboardStats, Movement, stock_alerts};
use agristock_products::{NewProduct, Product};

use crate::store::{Collection, CollectionWrite, DataStore, load_typed};

use super::ServiceError;

/// Reads over products, fields and history, plus product registration.
#[derive(Debug, Clone)]
pub struct InventoryService<S> {
    store: S,
}

impl<S> InventoryService<S>
where
    S: DataStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Products in insertion order.
    pub fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(load_typed(&self.store, Collection::Products)?.records)
    }

    /// Fields in insertion order.
    pub fn list_fields(&self) -> Result<Vec<Field>, ServiceError> {
        Ok(load_typed(&self.store, Collection::Fields)?.records)
    }

    /// Movement history, newest first.
    pub fn list_movements(&self) -> Result<Vec<Movement>, ServiceError> {
        Ok(load_typed(&self.store, Collection::Movements)?.records)
    }

    pub fn product(&self, id: &ProductId) -> Result<Option<Product>, ServiceError> {
        Ok(self.list_products()?.into_iter().find(|p| p.id() == id))
    }

    /// Products whose name or batch contains `term` (case-insensitive).
    pub fn search_products(&self, term: &str) -> Result<Vec<Product>, ServiceError> {
        Ok(self
            .list_products()?
            .into_iter()
            .filter(|p| p.matches_search(term))
            .collect())
    }

    /// Register a new product with a fresh id and append it.
    ///
    /// No notification fires for registration.
    pub fn register_product(&self, input: NewProduct) -> Result<Product, ServiceError> {
        let product = Product::register(ProductId::generate(), input)?;

        let mut products = load_typed::<Product, _>(&self.store, Collection::Products)?;
        let expected = ExpectedVersion::Exact(products.version);
        products.records.push(product.clone());

        self.store.commit(vec![CollectionWrite::typed(
            Collection::Products,
            expected,
            &products.records,
        )?])?;

        tracing::info!(
            product_id = %product.id(),
            name = product.name(),
            category = %product.category(),
            "product registered"
        );
        Ok(product)
    }

    /// Dashboard statistics, computed fresh from the stored products.
    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardStats, ServiceError> {
        Ok(DashboardStats::compute(&self.list_products()?, today))
    }

    /// Standing CRITICAL_STOCK and EXPIRED alerts.
    pub fn alerts(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<Vec<Alert>, ServiceError> {
        Ok(stock_alerts(&self.list_products()?, today, now))
    }
}
