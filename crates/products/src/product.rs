use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agristock_core::{DomainError, DomainResult, Entity, ProductId};

/// Product category.
///
/// Purely descriptive: categories drive grouping on the dashboard, never stock
/// behavior. Aliases accept the Portuguese spellings found in older data files.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(alias = "Herbicida")]
    Herbicide,
    #[serde(alias = "Fungicida")]
    Fungicide,
    #[serde(alias = "Inseticida")]
    Insecticide,
    Foliar,
    #[serde(alias = "Adjuvante")]
    Adjuvant,
    #[serde(alias = "Regulador")]
    Regulator,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Herbicide,
        Category::Fungicide,
        Category::Insecticide,
        Category::Foliar,
        Category::Adjuvant,
        Category::Regulator,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Herbicide => "Herbicide",
            Category::Fungicide => "Fungicide",
            Category::Insecticide => "Insecticide",
            Category::Foliar => "Foliar",
            Category::Adjuvant => "Adjuvant",
            Category::Regulator => "Regulator",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit a product is stocked in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(alias = "L")]
    Liters,
    #[serde(alias = "Kg")]
    Kilograms,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Liters => "L",
            Unit::Kilograms => "kg",
        }
    }
}

/// Registration input: a product without its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub category: Category,
    pub batch: String,
    pub expiry_date: NaiveDate,
    pub unit: Unit,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
}

impl NewProduct {
    /// Field requirements for registration: a name and non-negative stock levels.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.current_stock < Decimal::ZERO {
            return Err(DomainError::validation("current stock cannot be negative"));
        }
        if self.min_stock < Decimal::ZERO {
            return Err(DomainError::validation("minimum stock cannot be negative"));
        }
        Ok(())
    }
}

/// A stocked agricultural input.
///
/// `current_stock` changes only through the movement engine; everything else
/// is fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    category: Category,
    batch: String,
    expiry_date: NaiveDate,
    unit: Unit,
    current_stock: Decimal,
    min_stock: Decimal,
}

impl Product {
    /// Build a product from validated registration input.
    pub fn register(id: ProductId, input: NewProduct) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            name: input.name.trim().to_string(),
            category: input.category,
            batch: input.batch.trim().to_string(),
            expiry_date: input.expiry_date,
            unit: input.unit,
            current_stock: input.current_stock,
            min_stock: input.min_stock,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn batch(&self) -> &str {
        &self.batch
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn current_stock(&self) -> Decimal {
        self.current_stock
    }

    pub fn min_stock(&self) -> Decimal {
        self.min_stock
    }

    /// At or below the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }

    /// Strictly past its expiry date (a product expiring today is still usable).
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }

    /// Case-insensitive match on name or batch. A blank term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term) || self.batch.to_lowercase().contains(&term)
    }

    /// Copy of this product with a new stock level; all other fields unchanged.
    pub fn with_current_stock(&self, current_stock: Decimal) -> Self {
        Self {
            current_stock,
            ..self.clone()
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
