//! First-run fixture data.
//!
//! Products and fields are written only when their collection is absent;
//! movements start as an empty array. Seeding an already-seeded store is a
//! no-op.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use agristock_core::{DomainError, DomainResult, ExpectedVersion, FieldId, ProductId};
use agristock_fields::Field;
use agristock_inventory::Movement;
use agristock_products::{Category, NewProduct, Product, Unit};

use crate::store::{Collection, CollectionWrite, DataStore, StoreError};

/// Which collections a seeding pass actually wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub products: bool,
    pub fields: bool,
    pub movements: bool,
}

impl SeedReport {
    pub fn wrote_anything(&self) -> bool {
        self.products || self.fields || self.movements
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("invalid fixture: {0}")]
    Fixture(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    id: &str,
    name: &str,
    category: Category,
    batch: &str,
    expiry: (i32, u32, u32),
    unit: Unit,
    current_stock: i64,
    min_stock: i64,
) -> DomainResult<Product> {
    let (y, m, d) = expiry;
    let expiry_date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| DomainError::validation(format!("invalid expiry date for fixture {id}")))?;
    Product::register(
        ProductId::from(id),
        NewProduct {
            name: name.to_string(),
            category,
            batch: batch.to_string(),
            expiry_date,
            unit,
            current_stock: Decimal::from(current_stock),
            min_stock: Decimal::from(min_stock),
        },
    )
}

/// Five sample products; "Ciproconazol Top" starts below its minimum.
pub fn fixture_products() -> DomainResult<Vec<Product>> {
    Ok(vec![
        fixture("1", "Glifosato Premium", Category::Herbicide, "L-2023-001", (2025, 12, 31), Unit::Liters, 500, 100)?,
        fixture("2", "Ciproconazol Top", Category::Fungicide, "F-2023-099", (2024, 11, 20), Unit::Liters, 45, 50)?,
        fixture("3", "Imidacloprido Force", Category::Insecticide, "I-2024-010", (2026, 5, 15), Unit::Kilograms, 200, 20)?,
        fixture("4", "Aminasol Foliar", Category::Foliar, "FO-2023-55", (2024, 8, 1), Unit::Liters, 1200, 200)?,
        fixture("5", "Óleo Mineral Assist", Category::Adjuvant, "AD-2024-001", (2027, 1, 1), Unit::Liters, 300, 50)?,
    ])
}

/// Four sample fields.
pub fn fixture_fields() -> DomainResult<Vec<Field>> {
    Ok(vec![
        Field::new(FieldId::from("101"), "Talhão 01 - Sede", Decimal::from(50))?,
        Field::new(FieldId::from("102"), "Talhão 02 - Rio", Decimal::from(120))?,
        Field::new(FieldId::from("103"), "Talhão 03 - Mata", Decimal::from(85))?,
        Field::new(FieldId::from("104"), "Talhão 04 - Fundo", Decimal::from(200))?,
    ])
}

/// Write fixtures into every absent collection, in one commit.
pub fn seed_if_absent<S>(store: &S) -> Result<SeedReport, SeedError>
where
    S: DataStore + ?Sized,
{
    let mut report = SeedReport::default();
    let mut writes = Vec::new();

    if store.load(Collection::Products)?.is_absent() {
        writes.push(CollectionWrite::typed(
            Collection::Products,
            ExpectedVersion::Exact(0),
            &fixture_products()?,
        )?);
        report.products = true;
    }
    if store.load(Collection::Fields)?.is_absent() {
        writes.push(CollectionWrite::typed(
            Collection::Fields,
            ExpectedVersion::Exact(0),
            &fixture_fields()?,
        )?);
        report.fields = true;
    }
    if store.load(Collection::Movements)?.is_absent() {
        writes.push(CollectionWrite::typed::<Movement>(
            Collection::Movements,
            ExpectedVersion::Exact(0),
            &[],
        )?);
        report.movements = true;
    }

    store.commit(writes)?;
    if report.wrote_anything() {
        tracing::info!(?report, "seeded store with fixture data");
    }
    Ok(report)
}
