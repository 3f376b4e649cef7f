use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// A listener invoked with a cell's current value.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Generate the next unique ID for a cell or a listener.
pub(crate) fn next_id() -> usize {
    static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}

/// Identifies one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(usize);

/// Ordered registry of listeners attached to one cell.
///
/// Listeners are kept in subscription order; removal preserves the order of
/// the remaining entries.
pub(crate) struct SubscriberList<T> {
    cell: usize,
    name: &'static str,
    entries: RwLock<Vec<(SubscriberId, Listener<T>)>>,
}

impl<T> SubscriberList<T> {
    pub(crate) fn new(cell: usize, name: &'static str) -> Self {
        Self {
            cell,
            name,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, listener: Listener<T>) -> SubscriberId {
        let id = SubscriberId(next_id());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push((id, listener));
        tracing::trace!(
            cell = self.cell,
            cell_name = self.name,
            subscriber = id.0,
            subscribers = entries.len(),
            "listener subscribed"
        );
        id
    }

    pub(crate) fn remove(&self, id: SubscriberId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        let removed = entries.len() != before;
        if removed {
            tracing::trace!(
                cell = self.cell,
                cell_name = self.name,
                subscriber = id.0,
                subscribers = entries.len(),
                "listener unsubscribed"
            );
        }
        removed
    }

    /// Copy out the listeners so none of the registry locks are held while
    /// they run.
    pub(crate) fn snapshot(&self) -> Vec<Listener<T>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Type-erased removal, so a [`Subscription`] does not carry the value type.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SubscriberId) -> bool;
}

impl<T: 'static> Detach for SubscriberList<T> {
    fn detach(&self, id: SubscriberId) -> bool {
        self.remove(id)
    }
}

/// RAII guard for a cell listener.
///
/// Dropping the guard unsubscribes the listener. Use [`Subscription::detach`]
/// to keep the listener registered for as long as the cell lives.
#[must_use = "dropping a Subscription immediately unsubscribes its listener"]
pub struct Subscription {
    id: SubscriberId,
    list: Option<Weak<dyn Detach>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, list: Weak<dyn Detach>) -> Self {
        Self {
            id,
            list: Some(list),
        }
    }

    /// The listener this guard controls.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the listener now.
    ///
    /// Returns `false` if the cell is already gone or the listener was
    /// removed before.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    /// Give up the guard without unsubscribing.
    pub fn detach(mut self) {
        self.list = None;
    }

    fn release(&mut self) -> bool {
        match self.list.take().and_then(|list| list.upgrade()) {
            Some(list) => list.detach(self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.list.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> Arc<SubscriberList<i32>> {
        Arc::new(SubscriberList::new(next_id(), "test"))
    }

    #[test]
    fn removal_preserves_order() {
        let list = list();
        let a = list.add(Arc::new(|_: &i32| {}));
        let b = list.add(Arc::new(|_: &i32| {}));
        let c = list.add(Arc::new(|_: &i32| {}));

        assert!(list.remove(b));
        assert!(!list.remove(b));

        let ids: Vec<_> = list
            .entries
            .read()
            .unwrap()
            .iter()
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn guard_unsubscribes_on_drop() {
        let list = list();
        let id = list.add(Arc::new(|_: &i32| {}));
        let weak: Weak<dyn Detach> = Arc::downgrade(&list) as Weak<dyn Detach>;

        drop(Subscription::new(id, weak));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn detached_guard_keeps_listener() {
        let list = list();
        let id = list.add(Arc::new(|_: &i32| {}));
        let weak: Weak<dyn Detach> = Arc::downgrade(&list) as Weak<dyn Detach>;

        Subscription::new(id, weak).detach();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn unsubscribe_after_list_dropped() {
        let list = list();
        let id = list.add(Arc::new(|_: &i32| {}));
        let weak: Weak<dyn Detach> = Arc::downgrade(&list) as Weak<dyn Detach>;
        let guard = Subscription::new(id, weak);

        drop(list);
        assert!(!guard.unsubscribe());
    }
}
