//! Movement submission pipeline.
//!
//! ```text
//! MovementRequest
//!   ↓
//! 1. Load products, fields, movements (with versions)
//!   ↓
//! 2. StockLedger::record (pure validate + apply in memory)
//!   ↓
//! 3. Commit products + movements together, guarded by the loaded versions
//!   ↓
//! 4. Publish MovementRecorded (best-effort; failure is logged, never undone)
//! ```
//!
//! A rejection in step 2 or a conflict in step 3 persists nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agristock_core::{Entity, FieldId, MovementId, ProductId};
use agristock_events::{Event, EventBus};
use agristock_fields::Field;
use agristock_inventory::{Movement, MovementRecorded, MovementType, StockLedger, SubmitMovement};
use agristock_products::Product;

use crate::store::{Collection, CollectionWrite, DataStore, load_typed};

use super::ServiceError;

/// What the operator submits: no id, no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    #[serde(rename = "type")]
    pub kind: MovementType,
    pub product_id: ProductId,
    pub quantity: Decimal,
    #[serde(default)]
    pub field_id: Option<FieldId>,
}

impl MovementRequest {
    pub fn entry(product_id: ProductId, quantity: Decimal) -> Self {
        Self {
            kind: MovementType::Entry,
            product_id,
            quantity,
            field_id: None,
        }
    }

    pub fn exit(product_id: ProductId, quantity: Decimal, field_id: FieldId) -> Self {
        Self {
            kind: MovementType::Exit,
            product_id,
            quantity,
            field_id: Some(field_id),
        }
    }

    /// Stamp the request with a fresh id and the given business time.
    pub fn into_command(self, occurred_at: DateTime<Utc>) -> SubmitMovement {
        SubmitMovement {
            movement_id: MovementId::generate(),
            kind: self.kind,
            product_id: self.product_id,
            quantity: self.quantity,
            field_id: self.field_id,
            occurred_at,
        }
    }
}

/// Validates and applies stock movements against the store.
///
/// The engine holds no state of its own: every submission works on a fresh
/// snapshot. The bus is only a side channel; nothing here waits on consumers.
#[derive(Debug)]
pub struct MovementService<S, B> {
    store: S,
    bus: B,
}

impl<S, B> MovementService<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

    pub fn into_parts(self) -> (S, B) {
        (self.store, self.bus)
    }
}

impl<S, B> MovementService<S, B>
where
    S: DataStore,
    B: EventBus<MovementRecorded>,
{
    /// Submit a movement with a fresh id, timestamped with the wall clock.
    /// Use [`dispatch`](Self::dispatch) when the id and time must be fixed.
    pub fn submit_movement(&self, request: MovementRequest) -> Result<MovementRecorded, ServiceError> {
        self.dispatch(request.into_command(Utc::now()))
    }

    /// Run a fully specified command through validate → commit → publish.
    ///
    /// This is the deterministic entry point: the caller supplies the
    /// movement id and `occurred_at`, and nothing here reads the clock.
    pub fn dispatch(&self, cmd: SubmitMovement) -> Result<MovementRecorded, ServiceError> {
        let products = load_typed::<Product, _>(&self.store, Collection::Products)?;
        let fields = load_typed::<Field, _>(&self.store, Collection::Fields)?;
        let movements = load_typed::<Movement, _>(&self.store, Collection::Movements)?;
        let (products_expected, movements_expected) = (products.expected(), movements.expected());

        let mut ledger = StockLedger::new(products.records, fields.records, movements.records);
        let event = match ledger.record(&cmd) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(
                    movement_id = %cmd.movement_id,
                    product_id = %cmd.product_id,
                    kind = %cmd.kind,
                    error = %err,
                    "movement rejected"
                );
                return Err(err.into());
            }
        };

        let (products, _, movements) = ledger.into_parts();
        self.store.commit(vec![
            CollectionWrite::typed(Collection::Products, products_expected, &products)?,
            CollectionWrite::typed(Collection::Movements, movements_expected, &movements)?,
        ])?;

        tracing::info!(
            event_type = event.event_type(),
            movement_id = %event.movement.id(),
            product_id = %event.product.id(),
            kind = %event.movement.kind(),
            quantity = %event.movement.quantity(),
            stock = %event.resulting_stock(),
            dose_per_ha = ?event.movement.calculated_dose_per_ha(),
            "movement recorded"
        );

        if let Err(err) = self.bus.publish(event.clone()) {
            tracing::warn!(
                movement_id = %event.movement.id(),
                error = %err,
                "failed to publish movement notification"
            );
        }

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use agristock_events::{InMemoryEventBus, Subscription};
    use agristock_inventory::MovementError;

    use crate::seed::seed_if_absent;
    use crate::services::InventoryService;
    use crate::store::{InMemoryStore, StoreError};

    type Bus = Arc<InMemoryEventBus<MovementRecorded>>;

    struct Harness {
        movements: MovementService<Arc<InMemoryStore>, Bus>,
        inventory: InventoryService<Arc<InMemoryStore>>,
        store: Arc<InMemoryStore>,
        events: Subscription<MovementRecorded>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        seed_if_absent(&store).unwrap();
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let events = bus.subscribe();
        Harness {
            movements: MovementService::new(store.clone(), bus),
            inventory: InventoryService::new(store.clone()),
            store,
            events,
        }
    }

    fn stock(h: &Harness, id: &str) -> Decimal {
        h.inventory
            .product(&ProductId::from(id))
            .unwrap()
            .unwrap()
            .current_stock()
    }

    #[test]
    fn entry_on_low_stock_product_clears_the_alert() {
        let h = harness();

        h.movements
            .submit_movement(MovementRequest::entry(ProductId::from("2"), Decimal::from(10)))
            .unwrap();

        assert_eq!(stock(&h, "2"), Decimal::from(55));
        let stats = h.inventory.dashboard(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap();
        assert!(stats.low_stock_alerts.iter().all(|p| p.id().as_str() != "2"));
        assert_eq!(stats.low_stock_count, 0);
    }

    #[test]
    fn exit_records_dose_and_field_name() {
        let h = harness();

        let event = h
            .movements
            .submit_movement(MovementRequest::exit(
                ProductId::from("1"),
                Decimal::from(100),
                FieldId::from("101"),
            ))
            .unwrap();

        assert_eq!(stock(&h, "1"), Decimal::from(400));
        let stored = h.inventory.list_movements().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].calculated_dose_per_ha(), Some(Decimal::new(200, 2)));
        assert_eq!(stored[0].field_name(), Some("Talhão 01 - Sede"));
        assert_eq!(stored[0], event.movement);
    }

    #[test]
    fn overdraw_persists_nothing_and_publishes_nothing() {
        let h = harness();
        let before_products = h.store.load(Collection::Products).unwrap();
        let before_movements = h.store.load(Collection::Movements).unwrap();

        let err = h
            .movements
            .submit_movement(MovementRequest::exit(
                ProductId::from("1"),
                Decimal::from(600),
                FieldId::from("101"),
            ))
            .unwrap_err();

        assert!(matches!(
            err.movement_error(),
            Some(MovementError::InsufficientStock { .. })
        ));
        assert_eq!(stock(&h, "1"), Decimal::from(500));
        assert_eq!(h.store.load(Collection::Products).unwrap(), before_products);
        assert_eq!(h.store.load(Collection::Movements).unwrap(), before_movements);
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn history_is_prepended() {
        let h = harness();

        let m1 = h
            .movements
            .submit_movement(MovementRequest::entry(ProductId::from("3"), Decimal::from(5)))
            .unwrap();
        let m2 = h
            .movements
            .submit_movement(MovementRequest::exit(
                ProductId::from("3"),
                Decimal::from(20),
                FieldId::from("104"),
            ))
            .unwrap();

        let ids: Vec<_> = h
            .inventory
            .list_movements()
            .unwrap()
            .iter()
            .map(|m| m.id().clone())
            .collect();
        assert_eq!(ids, vec![m2.movement.id().clone(), m1.movement.id().clone()]);
    }

    #[test]
    fn committed_movement_is_published_once() {
        let h = harness();

        let event = h
            .movements
            .submit_movement(MovementRequest::entry(ProductId::from("5"), Decimal::from(1)))
            .unwrap();

        assert_eq!(h.events.drain(), vec![event]);
    }

    #[test]
    fn missing_subscribers_do_not_fail_the_movement() {
        let store = Arc::new(InMemoryStore::new());
        seed_if_absent(&store).unwrap();
        let service = MovementService::new(store, InMemoryEventBus::<MovementRecorded>::new());

        assert!(service
            .submit_movement(MovementRequest::entry(ProductId::from("1"), Decimal::from(1)))
            .is_ok());
    }

    #[test]
    fn concurrent_write_between_load_and_commit_is_a_conflict() {
        // A store that sneaks a write in right after the first products load.
        #[derive(Debug)]
        struct Interleaving {
            inner: InMemoryStore,
            fired: std::sync::atomic::AtomicBool,
        }

        impl DataStore for Interleaving {
            fn load(&self, collection: Collection) -> Result<crate::store::Snapshot, StoreError> {
                let snapshot = self.inner.load(collection)?;
                if collection == Collection::Movements
                    && !self.fired.swap(true, std::sync::atomic::Ordering::SeqCst)
                {
                    let current = self.inner.load(Collection::Products)?;
                    self.inner.commit(vec![CollectionWrite::new(
                        Collection::Products,
                        agristock_core::ExpectedVersion::Exact(current.version),
                        current.records,
                    )])?;
                }
                Ok(snapshot)
            }

            fn commit(&self, writes: Vec<CollectionWrite>) -> Result<Vec<u64>, StoreError> {
                self.inner.commit(writes)
            }
        }

        let store = Interleaving {
            inner: InMemoryStore::new(),
            fired: std::sync::atomic::AtomicBool::new(false),
        };
        seed_if_absent(&store.inner).unwrap();
        let service = MovementService::new(store, InMemoryEventBus::<MovementRecorded>::new());

        let err = service
            .submit_movement(MovementRequest::entry(ProductId::from("1"), Decimal::from(1)))
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Store(StoreError::Conflict { collection: Collection::Products, .. })
        ));
        let (store, _) = service.into_parts();
        assert!(store.inner.load(Collection::Movements).unwrap().records.is_empty());
    }

    #[test]
    fn dispatch_keeps_the_callers_id_and_time() {
        use chrono::TimeZone;

        let h = harness();
        let occurred_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let cmd = MovementRequest::exit(ProductId::from("4"), Decimal::from(30), FieldId::from("103"))
            .into_command(occurred_at);
        let cmd = SubmitMovement {
            movement_id: MovementId::from("mv-fixed"),
            ..cmd
        };

        h.movements.dispatch(cmd).unwrap();

        let stored = h.inventory.list_movements().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id(), &MovementId::from("mv-fixed"));
        assert_eq!(stored[0].date(), occurred_at);
    }

    #[test]
    fn high_scale_quantity_is_stored_exactly() {
        let h = harness();
        let quantity: Decimal = "0.123456789012345678".parse().unwrap();

        h.movements
            .submit_movement(MovementRequest::entry(ProductId::from("1"), quantity))
            .unwrap();

        let expected: Decimal = "500.123456789012345678".parse().unwrap();
        assert_eq!(stock(&h, "1"), expected);
        let stored = h.inventory.list_movements().unwrap();
        assert_eq!(stored[0].quantity().value(), quantity);
        let raw = h.store.load(Collection::Products).unwrap();
        assert!(raw.records.iter().any(|p| p["currentStock"].to_string() == "500.123456789012345678"));
    }
}
