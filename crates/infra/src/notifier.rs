//! Movement notifications.
//!
//! A worker thread drains a bus subscription, turns every
//! [`MovementRecorded`] into a [`Notification`] and hands it to a sink.
//! Sink failures are logged and dropped; the movement is already committed.

use std::sync::{Arc, Mutex};
use std::thread;

use thiserror::Error;

use agristock_events::Subscription;
use agristock_inventory::{AlertKind, MovementRecorded, Notification};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for operator-facing notifications.
pub trait NotificationSink: Send {
    fn deliver(&mut self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<F> NotificationSink for F
where
    F: FnMut(&Notification) -> Result<(), NotifyError> + Send,
{
    fn deliver(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        self(notification)
    }
}

/// Emits notifications as structured log lines, one per alert: the movement
/// at `info`, a critical-stock warning at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn deliver(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        for alert in notification.alerts() {
            match alert.kind {
                AlertKind::CriticalStock => {
                    tracing::warn!(alert_id = %alert.id, kind = ?alert.kind, "{}", alert.message)
                }
                _ => tracing::info!(alert_id = %alert.id, kind = ?alert.kind, "{}", alert.message),
            }
        }
        Ok(())
    }
}

/// Keeps every delivered notification; shared so callers can inspect it.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .map_err(|_| NotifyError::Unavailable("recording sink poisoned".to_string()))?
            .push(notification.clone());
        Ok(())
    }
}

/// Handle to a running notification worker.
#[derive(Debug)]
pub struct NotificationWorker {
    join: thread::JoinHandle<usize>,
}

impl NotificationWorker {
    /// Spawn the worker. It stops once every publisher on the bus is gone.
    pub fn spawn<K>(subscription: Subscription<MovementRecorded>, mut sink: K) -> std::io::Result<Self>
    where
        K: NotificationSink + 'static,
    {
        let join = thread::Builder::new()
            .name("notifier".to_string())
            .spawn(move || {
                let mut delivered = 0usize;
                while let Ok(event) = subscription.recv() {
                    let notification = Notification::for_movement(&event);
                    match sink.deliver(&notification) {
                        Ok(()) => delivered += 1,
                        Err(err) => tracing::warn!(
                            movement_id = %notification.movement_id,
                            error = %err,
                            "notification dropped"
                        ),
                    }
                }
                tracing::debug!(delivered, "notifier stopped");
                delivered
            })?;
        Ok(Self { join })
    }

    /// Wait for the worker to drain and stop; returns how many notifications
    /// were delivered.
    pub fn join(self) -> usize {
        self.join.join().unwrap_or_else(|_| {
            tracing::error!("notifier thread panicked");
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use agristock_core::{MovementId, ProductId};
    use agristock_events::{EventBus, InMemoryEventBus};
    use agristock_inventory::{MovementType, StockLedger, SubmitMovement};
    use agristock_products::{Category, NewProduct, Product, Unit};

    fn event(id: &str, quantity: i64) -> MovementRecorded {
        let product = Product::register(
            ProductId::from("5"),
            NewProduct {
                name: "Óleo Mineral Assist".to_string(),
                category: Category::Adjuvant,
                batch: "AD-2024-001".to_string(),
                expiry_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
                unit: Unit::Liters,
                current_stock: Decimal::from(300),
                min_stock: Decimal::from(50),
            },
        )
        .unwrap();
        StockLedger::new(vec![product], vec![], vec![])
            .handle(&SubmitMovement {
                movement_id: MovementId::from(id),
                kind: MovementType::Entry,
                product_id: ProductId::from("5"),
                quantity: Decimal::from(quantity),
                field_id: None,
                occurred_at: Utc::now(),
            })
            .unwrap()
    }

    #[test]
    fn worker_delivers_until_bus_is_dropped() {
        let bus = InMemoryEventBus::new();
        let sink = RecordingSink::new();
        let worker = NotificationWorker::spawn(bus.subscribe(), sink.clone()).unwrap();

        bus.publish(event("m1", 1)).unwrap();
        bus.publish(event("m2", 2)).unwrap();
        drop(bus);

        assert_eq!(worker.join(), 2);
        let messages: Vec<_> = sink.delivered().into_iter().map(|n| n.message).collect();
        assert_eq!(
            messages,
            vec![
                "Entry recorded: +1 on Óleo Mineral Assist.".to_string(),
                "Entry recorded: +2 on Óleo Mineral Assist.".to_string(),
            ]
        );
    }

    #[test]
    fn failing_sink_drops_the_notification_and_keeps_going() {
        let bus = InMemoryEventBus::new();
        let mut calls = 0;
        let flaky = move |_: &Notification| {
            calls += 1;
            if calls == 1 {
                Err(NotifyError::Unavailable("offline".to_string()))
            } else {
                Ok(())
            }
        };
        let worker = NotificationWorker::spawn(bus.subscribe(), flaky).unwrap();

        bus.publish(event("m1", 1)).unwrap();
        bus.publish(event("m2", 1)).unwrap();
        drop(bus);

        assert_eq!(worker.join(), 1);
    }

    #[test]
    fn tracing_sink_never_fails() {
        let notification = Notification::for_movement(&event("m1", 3));
        assert!(TracingSink.deliver(&notification).is_ok());
    }
}
