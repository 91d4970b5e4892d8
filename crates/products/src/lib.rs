//! Products domain module.
//!
//! Agricultural inputs held in stock (herbicides, fungicides, ...), with their
//! batch, expiry date and stock thresholds. Pure domain logic (no IO).

pub mod product;

pub use product::{Category, NewProduct, Product, Unit};
