//! `agristock-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the product, field
//! and movement modules (no storage, no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{FieldId, MovementId, ProductId};
pub use value_object::Quantity;
pub use version::ExpectedVersion;
