//! Inventory domain module: stock movements and what is derived from them.
//!
//! Business rules only (no IO, no storage):
//! - [`movement`]: the append-only movement record
//! - [`engine`]: validate-then-apply for ENTRY/EXIT transactions
//! - [`dashboard`] and [`alerts`]: pure aggregations over a product snapshot
//! - [`notification`]: human-readable messages for committed movements

pub mod alerts;
pub mod dashboard;
pub mod engine;
pub mod movement;
pub mod notification;

pub use alerts::{Alert, AlertKind, stock_alerts};
pub use dashboard::{CategoryTotal, DashboardStats};
pub use engine::{MovementError, MovementRecorded, StockLedger, SubmitMovement, dose_per_hectare};
pub use movement::{Movement, MovementType};
pub use notification::Notification;
