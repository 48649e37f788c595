//! Adaptation events published by the linker.

use std::fmt;

use chrono::{DateTime, Utc};
use hublink_common::types::RequestId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the event channel before slow listeners start lagging.
pub const EVENT_CAPACITY: usize = 256;

/// The inbound request an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Start of a component.
    Start,
    /// Bindings contributed by type defaults after a start.
    DeferredBinding,
    /// Removal of every running instance of some types.
    StopByType,
    /// Removal of one component.
    Stop,
    /// Assignment of one attribute.
    Update,
    /// Raw script from a caller.
    Push,
}

impl Operation {
    /// Stable lowercase name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::DeferredBinding => "deferred_binding",
            Self::StopByType => "stop_by_type",
            Self::Stop => "stop",
            Self::Update => "update",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventKind {
    /// A script was handed to the apply engine.
    Submitted {
        /// Number of operations in the script.
        lines: usize,
    },
    /// The apply engine accepted the script.
    Applied,
    /// The apply engine rejected the script.
    Rejected,
    /// The apply engine never reported an outcome.
    Abandoned,
    /// Nothing needed to be submitted.
    Skipped {
        /// Why nothing was submitted.
        reason: String,
    },
}

/// One step in the life of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptationEvent {
    /// Request the event belongs to.
    pub request: RequestId,
    /// Operation of the request.
    pub operation: Operation,
    /// Component the request targets, if any.
    pub component: Option<String>,
    /// What happened.
    #[serde(flatten)]
    pub kind: EventKind,
    /// When it happened.
    pub at: DateTime<Utc>,
}

impl AdaptationEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn now(
        request: RequestId,
        operation: Operation,
        component: Option<&str>,
        kind: EventKind,
    ) -> Self {
        Self {
            request,
            operation,
            component: component.map(ToString::to_string),
            kind,
            at: Utc::now(),
        }
    }

    /// Whether this is the last event of its request.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self.kind, EventKind::Submitted { .. })
    }
}

/// Sending half of the event channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AdaptationEvent>,
}

impl EventBus {
    /// Creates a bus holding up to `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event. Events without listeners are dropped.
    pub fn publish(&self, event: AdaptationEvent) {
        tracing::trace!(request = %event.request, operation = %event.operation, "event");
        let _ = self.tx.send(event);
    }

    /// Opens a new listener that receives events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AdaptationEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CAPACITY)
    }
}
