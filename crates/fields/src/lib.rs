//! Fields (cultivated plots, "talhões") that receive product applications.

pub mod field;

pub use field::Field;
