use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agristock_core::{DomainError, DomainResult, Entity, FieldId};

/// A cultivated land plot, measured in hectares.
///
/// Reference data: read-only from the engine's point of view. Stored records
/// are not re-validated on load, so a persisted field may still carry a
/// non-positive area; [`Field::usable_hectares`] is the guard callers use
/// before dividing by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    id: FieldId,
    name: String,
    hectares: Decimal,
}

impl Field {
    pub fn new(id: FieldId, name: impl Into<String>, hectares: Decimal) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("field name cannot be empty"));
        }
        if hectares <= Decimal::ZERO {
            return Err(DomainError::validation("field area must be positive"));
        }
        Ok(Self { id, name, hectares })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hectares(&self) -> Decimal {
        self.hectares
    }

    /// The area, if it is usable as a divisor.
    pub fn usable_hectares(&self) -> Option<Decimal> {
        (self.hectares > Decimal::ZERO).then_some(self.hectares)
    }
}

impl Entity for Field {
    type Id = FieldId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_non_positive_area() {
        let err = Field::new(FieldId::from("101"), "Talhão 01", Decimal::ZERO).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_rejects_blank_name() {
        let err = Field::new(FieldId::from("101"), " ", Decimal::from(50)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn stored_zero_area_is_not_usable() {
        let field: Field =
            serde_json::from_str(r#"{"id":"9","name":"Broken","hectares":0}"#).unwrap();
        assert_eq!(field.usable_hectares(), None);
    }

    #[test]
    fn positive_area_is_usable() {
        let field = Field::new(FieldId::from("101"), "Talhão 01 - Sede", Decimal::from(50)).unwrap();
        assert_eq!(field.usable_hectares(), Some(Decimal::from(50)));
        assert_eq!(field.id().as_str(), "101");
    }
}
