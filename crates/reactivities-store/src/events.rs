use std::fmt;

use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Store operations that talk to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    LoadAll,
    LoadOne,
    Create,
    Edit,
    Delete,
    Attend,
    Unattend,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::LoadAll => "load activities",
            Operation::LoadOne => "load activity",
            Operation::Create => "create activity",
            Operation::Edit => "edit activity",
            Operation::Delete => "delete activity",
            Operation::Attend => "attend activity",
            Operation::Unattend => "cancel attendance",
        };
        f.write_str(name)
    }
}

/// Notifications published to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreEvent {
    /// Some observable state changed; take a fresh snapshot.
    Changed,

    /// An operation settled without touching the registry.
    OperationFailed { operation: Operation, message: String },
}

pub(crate) fn emit_event(tx: &broadcast::Sender<StoreEvent>, event: StoreEvent) {
    // Sending only fails when nobody is subscribed.
    if tx.send(event).is_err() {
        tracing::trace!("No store subscribers");
    }
}
