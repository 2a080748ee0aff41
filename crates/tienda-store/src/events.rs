//! Change notification for catalog writes.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Which collection a successful write touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogEvent {
    ProductsChanged,
    SellersChanged,
    CartChanged,
    LocationChanged,
}

/// Receiving end handed out by [`crate::CatalogStore::subscribe`].
///
/// Sees every event published after it was created, in write order. Dropping
/// it unsubscribes.
#[derive(Debug)]
pub struct CatalogSubscription {
    rx: UnboundedReceiver<CatalogEvent>,
}

impl CatalogSubscription {
    /// Wait for the next event. Returns `None` once the store is dropped.
    pub async fn recv(&mut self) -> Option<CatalogEvent> {
        self.rx.recv().await
    }

    /// Non-blocking poll.
    pub fn try_recv(&mut self) -> Option<CatalogEvent> {
        self.rx.try_recv().ok()
    }
}

#[derive(Debug, Default)]
pub(crate) struct EventHub {
    subscribers: Mutex<Vec<UnboundedSender<CatalogEvent>>>,
}

impl EventHub {
    pub(crate) fn subscribe(&self) -> CatalogSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        CatalogSubscription { rx }
    }

    pub(crate) fn publish(&self, event: CatalogEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event).is_ok());
        tracing::trace!(?event, subscribers = subscribers.len(), "catalog event published");
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
