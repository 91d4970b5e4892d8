//! Startup wiring for the `agristock` binary.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use agristock_events::{EventBus, InMemoryEventBus};
use agristock_fields::Field;
use agristock_infra::store::DataStore;
use agristock_infra::{
    AppConfig, InventoryService, MovementService, NotificationSink, NotificationWorker,
    ServiceError, seed_if_absent,
};
use agristock_inventory::{Alert, DashboardStats, Movement, MovementRecorded};

pub type SharedStore = Arc<dyn DataStore>;
pub type SharedBus = Arc<InMemoryEventBus<MovementRecorded>>;

/// How many history rows the startup report shows.
pub const RECENT_MOVEMENTS: usize = 10;

/// Everything the binary needs, wired around one store handle.
pub struct App {
    pub inventory: InventoryService<SharedStore>,
    pub movements: MovementService<SharedStore, SharedBus>,
    notifier: NotificationWorker,
}

impl App {
    /// Open the configured store, seed it if asked to, and start the notifier.
    pub fn start<K>(config: &AppConfig, sink: K) -> anyhow::Result<Self>
    where
        K: NotificationSink + 'static,
    {
        let store = config.open_store()?;
        if config.seed {
            seed_if_absent(&store)?;
        }

        let bus: SharedBus = Arc::new(InMemoryEventBus::new());
        let notifier = NotificationWorker::spawn(bus.subscribe(), sink)?;

        Ok(Self {
            inventory: InventoryService::new(store.clone()),
            movements: MovementService::new(store, bus),
            notifier,
        })
    }

    /// Stop accepting movements and wait for pending notifications.
    pub fn shutdown(self) -> usize {
        drop(self.movements);
        self.notifier.join()
    }

    pub fn report(&self, now: DateTime<Utc>) -> Result<DashboardReport, ServiceError> {
        DashboardReport::build(&self.inventory, now)
    }
}

/// Startup summary printed to stdout as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub as_of: NaiveDate,
    pub stats: DashboardStats,
    pub alerts: Vec<Alert>,
    pub fields: Vec<Field>,
    pub recent_movements: Vec<Movement>,
}

impl DashboardReport {
    pub fn build<S: DataStore>(
        inventory: &InventoryService<S>,
        now: DateTime<Utc>,
    ) -> Result<Self, ServiceError> {
        let today = now.date_naive();
        let mut recent_movements = inventory.list_movements()?;
        recent_movements.truncate(RECENT_MOVEMENTS);

        Ok(Self {
            as_of: today,
            stats: inventory.dashboard(today)?,
            alerts: inventory.alerts(today, now)?,
            fields: inventory.list_fields()?,
            recent_movements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agristock_core::{FieldId, ProductId};
    use agristock_infra::{MovementRequest, RecordingSink, StoreBackend};
    use chrono::TimeZone;
    use serde_json::Value;

    fn memory_app(sink: RecordingSink) -> App {
        App::start(&AppConfig::new(StoreBackend::Memory, "unused"), sink).unwrap()
    }

    #[test]
    fn seeded_report_matches_fixtures() {
        let app = memory_app(RecordingSink::new());
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        let report = app.report(now).unwrap();

        assert_eq!(report.stats.product_count, 5);
        assert_eq!(report.stats.low_stock_count, 1);
        assert_eq!(report.stats.expired_count, 2);
        assert_eq!(report.fields.len(), 4);
        assert!(report.recent_movements.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["asOf"], Value::from("2025-01-01"));
        assert!(json["stats"]["lowStockAlerts"].is_array());
        app.shutdown();
    }

    #[test]
    fn unseeded_memory_store_is_empty() {
        let config = AppConfig::new(StoreBackend::Memory, "unused").with_seed(false);
        let app = App::start(&config, RecordingSink::new()).unwrap();

        let report = app.report(Utc::now()).unwrap();

        assert_eq!(report.stats.product_count, 0);
        assert!(report.alerts.is_empty());
        app.shutdown();
    }

    #[test]
    fn shutdown_flushes_notifications() {
        let sink = RecordingSink::new();
        let app = memory_app(sink.clone());

        app.movements
            .submit_movement(MovementRequest::exit(
                ProductId::from("4"),
                "100".parse().unwrap(),
                FieldId::from("103"),
            ))
            .unwrap();

        assert_eq!(app.shutdown(), 1);
        assert_eq!(sink.delivered().len(), 1);
    }
}
