//! Movement engine: validate-then-apply for stock transactions.
//!
//! [`StockLedger`] holds one in-memory snapshot of products, fields and
//! movement history. `handle` is pure decision logic (it never mutates the
//! snapshot) and returns the [`MovementRecorded`] fact; `apply` evolves the
//! snapshot from that fact. Callers persist the evolved snapshot as a whole,
//! so either every effect of a movement lands or none does.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use agristock_core::{Entity, FieldId, MovementId, ProductId, Quantity};
use agristock_events::Event;
use agristock_fields::Field;
use agristock_products::Product;

use crate::movement::{Movement, MovementType};

/// Command: SubmitMovement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMovement {
    pub movement_id: MovementId,
    #[serde(rename = "type")]
    pub kind: MovementType,
    pub product_id: ProductId,
    pub quantity: Decimal,
    /// Destination of an EXIT. Ignored for ENTRY.
    #[serde(default)]
    pub field_id: Option<FieldId>,
    pub occurred_at: DateTime<Utc>,
}

/// Why a movement was rejected. Nothing is persisted for any of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MovementError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(Decimal),

    #[error("a field is required for an exit movement")]
    FieldRequired,

    #[error("field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("field {field_id} has an unusable area ({hectares} ha)")]
    InvalidField { field_id: FieldId, hectares: Decimal },
}

/// Event: MovementRecorded.
///
/// Carries the movement as it will be stored and the product as it looks after
/// the stock change, which is everything a notifier needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecorded {
    pub movement: Movement,
    pub product: Product,
}

impl MovementRecorded {
    /// Stock level right after this movement.
    pub fn resulting_stock(&self) -> Decimal {
        self.product.current_stock()
    }

    /// The movement left the product at or below its minimum.
    pub fn is_critical(&self) -> bool {
        self.product.is_low_stock()
    }
}

impl Event for MovementRecorded {
    fn event_type(&self) -> &'static str {
        "inventory.movement.recorded"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.movement.date()
    }
}

/// Dose per hectare rounded half-up to 2 decimal places.
///
/// `None` when the area is not positive or the quotient does not fit.
pub fn dose_per_hectare(quantity: Quantity, hectares: Decimal) -> Option<Decimal> {
    if hectares <= Decimal::ZERO {
        return None;
    }
    let mut dose = quantity
        .value()
        .checked_div(hectares)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    dose.rescale(2);
    Some(dose)
}

/// In-memory snapshot the engine decides against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockLedger {
    products: Vec<Product>,
    fields: Vec<Field>,
    movements: Vec<Movement>,
}

impl StockLedger {
    /// `movements` is the stored history, newest first.
    pub fn new(products: Vec<Product>, fields: Vec<Field>, movements: Vec<Movement>) -> Self {
        Self {
            products,
            fields,
            movements,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id() == id)
    }

    pub fn into_parts(self) -> (Vec<Product>, Vec<Field>, Vec<Movement>) {
        (self.products, self.fields, self.movements)
    }

    /// Decide whether a movement is acceptable (first violation wins).
    ///
    /// Validation order: product exists, quantity positive, EXIT has a known
    /// field, EXIT does not overdraw. The field area is checked last, while
    /// computing the dose. A resulting stock too large to represent is an
    /// `InvalidQuantity`.
    pub fn handle(&self, cmd: &SubmitMovement) -> Result<MovementRecorded, MovementError> {
        let product = self
            .product(&cmd.product_id)
            .ok_or_else(|| MovementError::ProductNotFound(cmd.product_id.clone()))?;

        let quantity =
            Quantity::new(cmd.quantity).map_err(|_| MovementError::InvalidQuantity(cmd.quantity))?;

        let field = if cmd.kind.requires_field() {
            let field_id = cmd.field_id.as_ref().ok_or(MovementError::FieldRequired)?;
            let field = self
                .field(field_id)
                .ok_or_else(|| MovementError::FieldNotFound(field_id.clone()))?;
            Some(field)
        } else {
            None
        };

        let available = product.current_stock();
        let new_stock = match cmd.kind {
            MovementType::Entry => available.checked_add(quantity.value()),
            MovementType::Exit => {
                if available < quantity.value() {
                    return Err(MovementError::InsufficientStock {
                        product_id: product.id().clone(),
                        available,
                        requested: quantity.value(),
                    });
                }
                available.checked_sub(quantity.value())
            }
        }
        .ok_or(MovementError::InvalidQuantity(cmd.quantity))?;

        let movement = match field {
            None => Movement::entry(cmd.movement_id.clone(), product, quantity, cmd.occurred_at),
            Some(field) => {
                let hectares = field.usable_hectares().ok_or_else(|| MovementError::InvalidField {
                    field_id: field.id().clone(),
                    hectares: field.hectares(),
                })?;
                let dose = dose_per_hectare(quantity, hectares)
                    .ok_or(MovementError::InvalidQuantity(cmd.quantity))?;
                Movement::exit(
                    cmd.movement_id.clone(),
                    product,
                    field,
                    quantity,
                    dose,
                    cmd.occurred_at,
                )
            }
        };

        Ok(MovementRecorded {
            movement,
            product: product.with_current_stock(new_stock),
        })
    }

    /// Evolve the snapshot: replace the product, prepend the movement.
    pub fn apply(&mut self, event: &MovementRecorded) {
        if let Some(slot) = self
            .products
            .iter_mut()
            .find(|p| p.id() == event.product.id())
        {
            *slot = event.product.clone();
        }
        self.movements.insert(0, event.movement.clone());
    }

    /// `handle` then `apply`.
    pub fn record(&mut self, cmd: &SubmitMovement) -> Result<MovementRecorded, MovementError> {
        let event = self.handle(cmd)?;
        self.apply(&event);
        Ok(event)
    }
}
