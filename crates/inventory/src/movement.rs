use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agristock_core::{Entity, FieldId, MovementId, ProductId, Quantity};
use agristock_fields::Field;
use agristock_products::Product;

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    /// Purchase / receipt: increases stock.
    #[serde(rename = "ENTRY", alias = "ENTRADA")]
    Entry,
    /// Application to a field: decreases stock, requires a field.
    #[serde(rename = "EXIT", alias = "SAIDA")]
    Exit,
}

impl MovementType {
    pub fn requires_field(&self) -> bool {
        matches!(self, MovementType::Exit)
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MovementType::Entry => f.write_str("ENTRY"),
            MovementType::Exit => f.write_str("EXIT"),
        }
    }
}

/// One committed stock-changing transaction.
///
/// Immutable once built. `product_name` and `field_name` are snapshots taken at
/// creation time so history stays readable if the referenced records change.
/// The field members and the dose are present iff the movement is an EXIT;
/// the two constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    id: MovementId,
    #[serde(rename = "type")]
    kind: MovementType,
    product_id: ProductId,
    product_name: String,
    quantity: Quantity,
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_id: Option<FieldId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calculated_dose_per_ha: Option<Decimal>,
}

impl Movement {
    pub fn entry(id: MovementId, product: &Product, quantity: Quantity, date: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: MovementType::Entry,
            product_id: product.id().clone(),
            product_name: product.name().to_string(),
            quantity,
            date,
            field_id: None,
            field_name: None,
            calculated_dose_per_ha: None,
        }
    }

    pub fn exit(
        id: MovementId,
        product: &Product,
        field: &Field,
        quantity: Quantity,
        dose_per_ha: Decimal,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind: MovementType::Exit,
            product_id: product.id().clone(),
            product_name: product.name().to_string(),
            quantity,
            date,
            field_id: Some(field.id().clone()),
            field_name: Some(field.name().to_string()),
            calculated_dose_per_ha: Some(dose_per_ha),
        }
    }

    pub fn kind(&self) -> MovementType {
        self.kind
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn field_id(&self) -> Option<&FieldId> {
        self.field_id.as_ref()
    }

    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    pub fn calculated_dose_per_ha(&self) -> Option<Decimal> {
        self.calculated_dose_per_ha
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use agristock_products::{Category, NewProduct, Unit};

    fn product() -> Product {
        Product::register(
            ProductId::from("1"),
            NewProduct {
                name: "Glifosato Premium".to_string(),
                category: Category::Herbicide,
                batch: "L-2023-001".to_string(),
                expiry_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                unit: Unit::Liters,
                current_stock: Decimal::from(500),
                min_stock: Decimal::from(100),
            },
        )
        .unwrap()
    }

    fn qty(v: i64) -> Quantity {
        Quantity::new(Decimal::from(v)).unwrap()
    }

    #[test]
    fn entry_omits_field_members_in_json() {
        let movement = Movement::entry(MovementId::from("m1"), &product(), qty(10), Utc::now());
        let json = serde_json::to_value(&movement).unwrap();

        assert_eq!(json["type"], "ENTRY");
        assert_eq!(json["productId"], "1");
        assert_eq!(json["productName"], "Glifosato Premium");
        assert!(json.get("fieldId").is_none());
        assert!(json.get("fieldName").is_none());
        assert!(json.get("calculatedDosePerHa").is_none());
    }

    #[test]
    fn exit_carries_field_snapshot_and_dose() {
        let field = Field::new(FieldId::from("101"), "Talhão 01 - Sede", Decimal::from(50)).unwrap();
        let movement = Movement::exit(
            MovementId::from("m2"),
            &product(),
            &field,
            qty(100),
            Decimal::from(2),
            Utc::now(),
        );

        assert_eq!(movement.kind(), MovementType::Exit);
        assert_eq!(movement.field_name(), Some("Talhão 01 - Sede"));
        assert_eq!(movement.calculated_dose_per_ha(), Some(Decimal::from(2)));
    }

    #[test]
    fn legacy_movement_types_deserialize() {
        let raw = r#"{
            "id": "1700000000000",
            "type": "SAIDA",
            "productId": "1",
            "productName": "Glifosato Premium",
            "quantity": 100,
            "date": "2024-05-01T12:00:00Z",
            "fieldId": "101",
            "fieldName": "Talhão 01 - Sede",
            "calculatedDosePerHa": 2
        }"#;

        let movement: Movement = serde_json::from_str(raw).unwrap();
        assert_eq!(movement.kind(), MovementType::Exit);
        assert_eq!(movement.field_id().map(FieldId::as_str), Some("101"));
    }
}
