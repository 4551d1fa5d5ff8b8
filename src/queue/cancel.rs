//! Cooperative cancellation shared between the UI side and the worker

use crate::queue::QueueItem;
use std::sync::{Arc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Holds the cancellation token of the current run
///
/// Each run arms a fresh token, so a cancel from a previous run never leaks
/// into the next one. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct CancelSwitch {
    current: Arc<Mutex<CancellationToken>>,
}

impl CancelSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the token with a fresh one and return it
    pub fn arm(&self) -> CancellationToken {
        let mut slot = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *slot = CancellationToken::new();
        slot.clone()
    }

    /// Request cancellation of the current run
    pub fn trigger(&self) {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token().is_cancelled()
    }

    pub fn token(&self) -> CancellationToken {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Read-only copy of the queue for rendering
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    items: Arc<RwLock<Vec<QueueItem>>>,
}

impl QueueSnapshot {
    pub fn read(&self) -> Vec<QueueItem> {
        self.items.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn find(&self, url: &str) -> Option<QueueItem> {
        self.items
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|item| item.url == url)
            .cloned()
    }

    pub(crate) fn publish(&self, items: &[QueueItem]) {
        *self.items.write().unwrap_or_else(|e| e.into_inner()) = items.to_vec();
    }

    /// Replace one item in place (matched by id)
    pub(crate) fn upsert(&self, item: &QueueItem) {
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        match items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => *slot = item.clone(),
            None => items.push(item.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_then_arm_clears() {
        let switch = CancelSwitch::new();
        let first = switch.arm();
        switch.trigger();
        assert!(first.is_cancelled());
        assert!(switch.is_triggered());

        let second = switch.arm();
        assert!(!second.is_cancelled());
        assert!(!switch.is_triggered());
    }

    #[test]
    fn test_clones_share_slot() {
        let switch = CancelSwitch::new();
        let ui_side = switch.clone();
        let token = switch.arm();
        ui_side.trigger();
        assert!(token.is_cancelled());
    }
}
