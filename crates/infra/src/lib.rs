//! Infrastructure layer: storage backends, application services, seeding,
//! configuration and the notification worker.

pub mod config;
pub mod notifier;
pub mod seed;
pub mod services;
pub mod store;


pub use config::{AppConfig, ConfigError, StoreBackend};
pub use notifier::{NotificationSink, NotificationWorker, NotifyError, RecordingSink, TracingSink};
pub use seed::{SeedError, SeedReport, seed_if_absent};
pub use services::{InventoryService, MovementRequest, MovementService, ServiceError};
