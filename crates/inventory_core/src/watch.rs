//! Change subscriptions over the item store.
//!
//! # Responsibility
//! - Keep the registry of subscribers interested in committed writes.
//! - Deliver an initial snapshot plus a fresh snapshot per relevant change
//!   to every watch handle.
//!
//! # Invariants
//! - Events are published only after an effective committed write; a no-op
//!   mutation never wakes a subscriber.
//! - Snapshots are computed at receive time, so a subscriber always
//!   observes a state at least as new as the event that woke it.
//! - Dropping a watch unsubscribes it; a watch never keeps the store alive.

use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::{ItemRepository, RepoResult, SqliteItemRepository};
use crate::store::StoreInner;
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::{Mutex, Weak};
use std::time::{Duration, Instant};

/// One committed, effective write against the items table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Inserted(ItemId),
    Updated(ItemId),
    Deleted(ItemId),
}

impl StoreEvent {
    pub fn item_id(self) -> ItemId {
        match self {
            Self::Inserted(id) | Self::Updated(id) | Self::Deleted(id) => id,
        }
    }

    fn concerns(self, id: ItemId) -> bool {
        self.item_id() == id
    }
}

/// Registry of live subscribers, notified after each effective write.
#[derive(Default)]
pub(crate) struct ChangeHub {
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl ChangeHub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.lock_subscribers().push(tx);
        rx
    }

    /// Fans the event out to all live subscribers and prunes dropped ones.
    pub(crate) fn publish(&self, event: StoreEvent) {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|tx| tx.send(event).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<Sender<StoreEvent>>> {
        // A poisoned registry still holds valid senders.
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Push-based stream of full list snapshots, ordered by name.
///
/// The first `recv` yields the current snapshot; each later `recv` blocks
/// until a committed write, then yields a fresh snapshot. Bursts of writes
/// are coalesced into one emission.
pub struct ItemsWatch {
    store: Weak<StoreInner>,
    rx: Receiver<StoreEvent>,
    initial: bool,
}

impl ItemsWatch {
    pub(crate) fn new(store: Weak<StoreInner>, rx: Receiver<StoreEvent>) -> Self {
        Self {
            store,
            rx,
            initial: true,
        }
    }

    /// Blocks for the next snapshot. Returns `None` once the store is gone.
    pub fn recv(&mut self) -> Option<RepoResult<Vec<Item>>> {
        if self.take_initial() {
            // The initial snapshot already reflects any queued events.
            self.drain_pending();
            return self.snapshot();
        }
        self.rx.recv().ok()?;
        self.drain_pending();
        self.snapshot()
    }

    /// Like `recv`, but gives up after `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<RepoResult<Vec<Item>>> {
        if self.take_initial() {
            self.drain_pending();
            return self.snapshot();
        }
        self.rx.recv_timeout(timeout).ok()?;
        self.drain_pending();
        self.snapshot()
    }

    /// Non-blocking variant; `None` when nothing new has been committed.
    pub fn try_recv(&mut self) -> Option<RepoResult<Vec<Item>>> {
        if self.take_initial() {
            self.drain_pending();
            return self.snapshot();
        }
        self.rx.try_recv().ok()?;
        self.drain_pending();
        self.snapshot()
    }

    fn take_initial(&mut self) -> bool {
        std::mem::take(&mut self.initial)
    }

    fn drain_pending(&self) {
        while self.rx.try_recv().is_ok() {}
    }

    fn snapshot(&self) -> Option<RepoResult<Vec<Item>>> {
        let inner = self.store.upgrade()?;
        let conn = inner.conn();
        Some(SqliteItemRepository::new(&conn).list_all())
    }
}

/// Push-based stream of snapshots for a single identity.
///
/// Emits `Some(item)` while the row exists and `None` after deletion.
/// Writes to other rows do not wake this watch.
pub struct ItemWatch {
    store: Weak<StoreInner>,
    rx: Receiver<StoreEvent>,
    id: ItemId,
    initial: bool,
}

impl ItemWatch {
    pub(crate) fn new(store: Weak<StoreInner>, rx: Receiver<StoreEvent>, id: ItemId) -> Self {
        Self {
            store,
            rx,
            id,
            initial: true,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Blocks for the next snapshot of the watched row. Returns `None` once
    /// the store is gone.
    pub fn recv(&mut self) -> Option<RepoResult<Option<Item>>> {
        if self.take_initial() {
            // The initial snapshot already reflects any queued events.
            self.drain_pending();
            return self.snapshot();
        }
        loop {
            let event = self.rx.recv().ok()?;
            if self.relevant_after_drain(event) {
                return self.snapshot();
            }
        }
    }

    /// Like `recv`, but gives up after `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<RepoResult<Option<Item>>> {
        if self.take_initial() {
            self.drain_pending();
            return self.snapshot();
        }
        let deadline = Instant::now() + timeout;
        loop {
            let event = self.rx.recv_deadline(deadline).ok()?;
            if self.relevant_after_drain(event) {
                return self.snapshot();
            }
        }
    }

    /// Non-blocking variant; `None` when no relevant write is pending.
    pub fn try_recv(&mut self) -> Option<RepoResult<Option<Item>>> {
        if self.take_initial() {
            self.drain_pending();
            return self.snapshot();
        }
        let mut relevant = false;
        while let Ok(event) = self.rx.try_recv() {
            relevant = relevant || event.concerns(self.id);
        }
        if relevant {
            return self.snapshot();
        }
        None
    }

    fn take_initial(&mut self) -> bool {
        std::mem::take(&mut self.initial)
    }

    fn drain_pending(&self) {
        while self.rx.try_recv().is_ok() {}
    }

    // Coalesces the pending backlog into a single relevance decision.
    fn relevant_after_drain(&self, first: StoreEvent) -> bool {
        let mut relevant = first.concerns(self.id);
        while let Ok(event) = self.rx.try_recv() {
            relevant = relevant || event.concerns(self.id);
        }
        relevant
    }

    fn snapshot(&self) -> Option<RepoResult<Option<Item>>> {
        let inner = self.store.upgrade()?;
        let conn = inner.conn();
        Some(SqliteItemRepository::new(&conn).get(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeHub, StoreEvent};

    #[test]
    fn publish_prunes_dropped_subscribers() {
        let hub = ChangeHub::new();
        let keep = hub.subscribe();
        let dropped = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        drop(dropped);
        hub.publish(StoreEvent::Inserted(1));

        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(keep.try_recv(), Ok(StoreEvent::Inserted(1)));
    }

    #[test]
    fn store_event_exposes_item_identity() {
        assert_eq!(StoreEvent::Inserted(7).item_id(), 7);
        assert_eq!(StoreEvent::Updated(8).item_id(), 8);
        assert_eq!(StoreEvent::Deleted(9).item_id(), 9);
    }
}
