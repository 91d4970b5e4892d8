//! Application services: the operations the presentation layer calls.
//!
//! Both services are constructed around an explicit store handle; there is no
//! process-wide state.

pub mod inventory;
pub mod movements;

pub use inventory::InventoryService;
pub use movements::{MovementRequest, MovementService};

use thiserror::Error;

use agristock_core::DomainError;
use agristock_inventory::MovementError;

use crate::store::StoreError;

/// Error surfaced to callers of the application services.
///
/// `Domain` and `Movement` are caller-recoverable input problems; `Store`
/// covers persistence failures, including version conflicts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("movement rejected: {0}")]
    Movement(#[from] MovementError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// The rejection reason, if this was a movement validation failure.
    pub fn movement_error(&self) -> Option<&MovementError> {
        match self {
            ServiceError::Movement(e) => Some(e),
            _ => None,
        }
    }
}
