use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::types::Operation;

/// A view the presentation layer should refetch
#[derive(Debug, Clone, Serialize)]
pub struct ViewEvent {
    pub table: &'static str,
    pub operation: Operation,
    pub paths: Vec<&'static str>,
    pub at: DateTime<Utc>,
}

/// Views that depend on each table
pub fn paths_for(table: &str) -> &'static [&'static str] {
    match table {
        "routines" => &["/", "/routine"],
        "mood_logs" => &["/", "/psychology"],
        "analytics_data" => &["/", "/analytics"],
        "user_reports" => &["/psychiatrist", "/psychiatrist/reports", "/psychology"],
        "psychiatrist_patients" => &["/psychiatrist", "/admin"],
        "profiles" => &["/settings", "/admin", "/admin/users"],
        _ => &[],
    }
}

/// Push-based stale-view notifications, fanned out to every subscriber
#[derive(Debug, Clone)]
pub struct ViewInvalidator {
    sender: broadcast::Sender<ViewEvent>,
}

impl ViewInvalidator {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.sender.subscribe()
    }

    /// Announce that a mutation on `table` made its views stale
    pub fn invalidate(&self, table: &'static str, operation: Operation) {
        let event = ViewEvent {
            table,
            operation,
            paths: paths_for(table).to_vec(),
            at: Utc::now(),
        };
        tracing::debug!("Invalidating {:?} after {:?} on {}", event.paths, operation, table);
        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}

impl Default for ViewInvalidator {
    fn default() -> Self {
        Self::new(64)
    }
}
