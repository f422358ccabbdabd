//! Listener registry shared by tables and relation views.
//!
//! Listeners are keyed by a monotonically increasing id and always invoked in
//! registration order.

use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// A registered listener.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Registry of listeners for one event source.
pub struct SubscriptionManager<E> {
    listeners: HashMap<SubscriptionId, Listener<E>>,
    next_id: SubscriptionId,
}

impl<E> Default for SubscriptionManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> SubscriptionManager<E> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers `callback` and returns the id to unsubscribe it with.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.insert(id, Rc::new(callback));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Snapshot of the listeners in registration order.
    ///
    /// Owners that keep the registry behind a `RefCell` invoke the snapshot
    /// after releasing the borrow, so a listener may subscribe or unsubscribe
    /// while it runs.
    pub fn callbacks(&self) -> Vec<Listener<E>> {
        let mut ids: Vec<SubscriptionId> = self.listeners.keys().copied().collect();
        ids.sort_unstable();
        ids.iter().map(|id| self.listeners[id].clone()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.listeners.contains_key(&id)
    }
}
