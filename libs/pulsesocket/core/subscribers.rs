//! Subscriber registry and subscription handles
//!
//! Dispatch iterates a snapshot of the registry taken when the event
//! arrives. Subscribers added during a dispatch pass start with the next
//! event; subscribers removed during a pass are skipped if they have not
//! been reached yet.

use crate::core::event::SocketEvent;
use crate::traits::Subscriber;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

/// Identifier of one registration
pub type SubscriptionId = u64;

/// Set of subscribers sharing one connection
pub struct SubscriberRegistry<M> {
    next_id: AtomicU64,
    entries: RwLock<HashMap<SubscriptionId, Arc<dyn Subscriber<M>>>>,
}

impl<M: Send + Sync + 'static> SubscriberRegistry<M> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber and return its handle
    pub fn subscribe(self: &Arc<Self>, subscriber: Arc<dyn Subscriber<M>>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.write().insert(id, subscriber);
        debug!("Subscriber {} registered ({} total)", id, self.len());

        let registry: Arc<dyn Detach> = Arc::clone(self) as Arc<dyn Detach>;
        Subscription {
            id,
            registry: Arc::downgrade(&registry),
            active: AtomicBool::new(true),
        }
    }

    /// Remove a registration; returns `false` if it was already gone
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let removed = self.entries.write().remove(&id).is_some();
        if removed {
            debug!("Subscriber {} removed", id);
        }
        removed
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Deliver one event to every current subscriber
    ///
    /// Returns the number of subscribers that handled the event without
    /// error or panic.
    pub fn dispatch(&self, event: &SocketEvent<M>) -> usize {
        let snapshot: Vec<(SubscriptionId, Arc<dyn Subscriber<M>>)> = self
            .entries
            .read()
            .iter()
            .map(|(id, subscriber)| (*id, Arc::clone(subscriber)))
            .collect();

        let mut delivered = 0;
        for (id, subscriber) in snapshot {
            if !self.contains(id) {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => warn!("Subscriber {} failed: {}", id, e),
                Err(_) => error!("Subscriber {} panicked while handling an event", id),
            }
        }

        delivered
    }
}

impl<M: Send + Sync + 'static> Default for SubscriberRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased removal so that `Subscription` is not generic over `M`
trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> bool;
}

impl<M: Send + Sync + 'static> Detach for SubscriberRegistry<M> {
    fn detach(&self, id: SubscriptionId) -> bool {
        self.remove(id)
    }
}

/// Capability that removes exactly one registration
///
/// `unsubscribe()` may be called any number of times; only the first call
/// has an effect. Dropping the handle unsubscribes as well.
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<dyn Detach>,
    active: AtomicBool,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::StatusEnvelope;
    use crate::traits::SocketError;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn counter(registry: &Arc<SubscriberRegistry<u32>>) -> (Subscription, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = registry.subscribe(Arc::new(move |_: &SocketEvent<u32>| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        (sub, count)
    }

    #[test]
    fn test_every_subscriber_receives_once() {
        let registry = Arc::new(SubscriberRegistry::new());
        let subs: Vec<_> = (0..3).map(|_| counter(&registry)).collect();

        assert_eq!(registry.dispatch(&SocketEvent::Message(7)), 3);
        for (_, count) in &subs {
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (sub_a, count_a) = counter(&registry);
        let (_sub_b, count_b) = counter(&registry);

        sub_a.unsubscribe();
        sub_a.unsubscribe();
        assert!(!sub_a.is_active());
        assert_eq!(registry.len(), 1);

        registry.dispatch(&SocketEvent::Message(1));
        assert_eq!(count_a.load(Ordering::SeqCst), 0);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = Arc::new(SubscriberRegistry::new());
        {
            let (_sub, _count) = counter(&registry);
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failing_subscribers_do_not_block_others() {
        let registry: Arc<SubscriberRegistry<u32>> = Arc::new(SubscriberRegistry::new());
        let _panics = registry.subscribe(Arc::new(|_: &SocketEvent<u32>| panic!("listener bug")));

        struct Failing;
        impl Subscriber<u32> for Failing {
            fn on_event(&self, _event: &SocketEvent<u32>) -> crate::Result<()> {
                Err(SocketError::Subscriber("rejected".into()))
            }
        }
        let _fails = registry.subscribe(Arc::new(Failing));
        let (_ok, count) = counter(&registry);

        assert_eq!(registry.dispatch(&SocketEvent::Status(StatusEnvelope::connected())), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_membership_changes_during_dispatch() {
        let registry: Arc<SubscriberRegistry<u32>> = Arc::new(SubscriberRegistry::new());
        let late: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));
        let late_count = Arc::new(AtomicUsize::new(0));

        // Registers a new subscriber every time it is called.
        let joiner = {
            let registry = Arc::downgrade(&registry);
            let late = Arc::clone(&late);
            let late_count = Arc::clone(&late_count);
            move |_: &SocketEvent<u32>| {
                if let Some(registry) = registry.upgrade() {
                    let late_count = Arc::clone(&late_count);
                    let sub = registry.subscribe(Arc::new(move |_: &SocketEvent<u32>| {
                        late_count.fetch_add(1, Ordering::SeqCst);
                    }));
                    late.lock().push(sub);
                }
            }
        };
        let _joiner = registry.subscribe(Arc::new(joiner));
        let counted: Vec<_> = (0..3).map(|_| counter(&registry)).collect();

        registry.dispatch(&SocketEvent::Message(1));

        for (_, count) in &counted {
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }
        // Joined mid-dispatch: starts with the next event
        assert_eq!(late_count.load(Ordering::SeqCst), 0);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_self_removal_during_dispatch() {
        let registry: Arc<SubscriberRegistry<u32>> = Arc::new(SubscriberRegistry::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let leaver = {
            let slot = Arc::clone(&slot);
            move |_: &SocketEvent<u32>| {
                if let Some(sub) = slot.lock().as_ref() {
                    sub.unsubscribe();
                }
            }
        };
        *slot.lock() = Some(registry.subscribe(Arc::new(leaver)));
        let (_other, count) = counter(&registry);

        registry.dispatch(&SocketEvent::Message(1));
        registry.dispatch(&SocketEvent::Message(2));

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 1);
    }
}
