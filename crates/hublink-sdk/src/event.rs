//! Adaptation event streaming.
//!
//! Provides an async listener for following what a linker submits and
//! how the apply engine answers.

use hublink_common::types::RequestId;
use hublink_runtime::engine::Linker;
use hublink_runtime::events::AdaptationEvent;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

/// Listens for the adaptation events of one linker.
#[derive(Debug)]
pub struct EventListener {
    rx: broadcast::Receiver<AdaptationEvent>,
}

impl EventListener {
    /// Subscribes to a linker. Only later events are received.
    #[must_use]
    pub fn new(linker: &Linker) -> Self {
        Self::from_receiver(linker.subscribe())
    }

    /// Wraps an existing receiver.
    #[must_use]
    pub const fn from_receiver(rx: broadcast::Receiver<AdaptationEvent>) -> Self {
        Self { rx }
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the linker is gone. Events missed by a slow
    /// listener are skipped with a warning.
    pub async fn next(&mut self) -> Option<AdaptationEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event listener lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns every event already delivered, without waiting.
    pub fn drain(&mut self) -> Vec<AdaptationEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event listener lagged, events dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
            }
        }
    }

    /// Waits for the last event of a request.
    ///
    /// Events of other requests are discarded.
    pub async fn wait_for(&mut self, request: RequestId) -> Option<AdaptationEvent> {
        while let Some(event) = self.next().await {
            if event.request == request && event.is_terminal() {
                return Some(event);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use hublink_runtime::events::{EventKind, Operation};

    use super::*;

    fn event(request: RequestId, kind: EventKind) -> AdaptationEvent {
        AdaptationEvent::now(request, Operation::Stop, Some("light_a"), kind)
    }

    #[tokio::test]
    async fn next_returns_none_when_sender_is_gone() {
        let (tx, rx) = broadcast::channel(4);
        let mut listener = EventListener::from_receiver(rx);
        let request = RequestId::generate();
        let _ = tx.send(event(request, EventKind::Applied));
        drop(tx);

        assert_eq!(listener.next().await.map(|e| e.request), Some(request));
        assert!(listener.next().await.is_none());
    }

    #[tokio::test]
    async fn next_skips_over_lag() {
        let (tx, rx) = broadcast::channel(1);
        let mut listener = EventListener::from_receiver(rx);
        let last = RequestId::generate();
        let _ = tx.send(event(RequestId::generate(), EventKind::Applied));
        let _ = tx.send(event(last, EventKind::Applied));

        assert_eq!(listener.next().await.map(|e| e.request), Some(last));
    }

    #[test]
    fn drain_collects_pending_events() {
        let (tx, rx) = broadcast::channel(8);
        let mut listener = EventListener::from_receiver(rx);
        let request = RequestId::generate();
        let _ = tx.send(event(request, EventKind::Submitted { lines: 2 }));
        let _ = tx.send(event(request, EventKind::Applied));

        assert_eq!(listener.drain().len(), 2);
        assert!(listener.drain().is_empty());
    }

    #[tokio::test]
    async fn wait_for_skips_other_requests() {
        let (tx, rx) = broadcast::channel(8);
        let mut listener = EventListener::from_receiver(rx);
        let mine = RequestId::generate();
        let _ = tx.send(event(RequestId::generate(), EventKind::Applied));
        let _ = tx.send(event(mine, EventKind::Submitted { lines: 1 }));
        let _ = tx.send(event(mine, EventKind::Rejected));

        let done = listener.wait_for(mine).await.expect("terminal event");
        assert_eq!(done.kind, EventKind::Rejected);
    }
}
