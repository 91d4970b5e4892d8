use chrono::{DateTime, Utc};
use serde::Serialize;

use agristock_core::{Entity, MovementId};

use crate::alerts::{Alert, AlertKind, critical_stock_message};
use crate::engine::MovementRecorded;

/// Message produced for one committed movement.
///
/// Fire-and-forget: there is no acknowledgement and no retry, and nothing on
/// the write path depends on it being delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub movement_id: MovementId,
    pub message: String,
    /// Present when the movement left the product at or below its minimum.
    pub critical_warning: Option<String>,
    pub date: DateTime<Utc>,
}

impl Notification {
    pub fn for_movement(event: &MovementRecorded) -> Self {
        let movement = &event.movement;
        // Only an EXIT carries a destination field.
        let message = match movement.field_name() {
            Some(field_name) => format!(
                "Exit recorded: {} of {} applied to {}.",
                movement.quantity(),
                movement.product_name(),
                field_name
            ),
            None => format!(
                "Entry recorded: +{} on {}.",
                movement.quantity(),
                movement.product_name()
            ),
        };

        Self {
            movement_id: movement.id().clone(),
            message,
            critical_warning: event
                .is_critical()
                .then(|| critical_stock_message(&event.product)),
            date: movement.date(),
        }
    }

    /// Single-line rendering for log/console sinks.
    pub fn render(&self) -> String {
        match &self.critical_warning {
            Some(warning) => format!("{} {}", self.message, warning),
            None => self.message.clone(),
        }
    }

    /// The notification as dashboard alerts (MOVEMENT, plus CRITICAL_STOCK when warned).
    pub fn alerts(&self) -> Vec<Alert> {
        let mut alerts = vec![Alert {
            id: self.movement_id.to_string(),
            kind: AlertKind::Movement,
            message: self.message.clone(),
            date: self.date,
        }];
        if let Some(warning) = &self.critical_warning {
            alerts.push(Alert {
                id: format!("{}-critical", self.movement_id),
                kind: AlertKind::CriticalStock,
                message: warning.clone(),
                date: self.date,
            });
        }
        alerts
    }
}
