use super::subscribers::{next_id, Detach, Listener, SubscriberList, Subscription};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

// Notification round states.
const IDLE: u8 = 0;
const RUNNING: u8 = 1;
// A round is running and another write arrived after it read the value.
const PENDING: u8 = 2;

/// State shared by every handle of one cell: the value and its listeners.
pub(crate) struct Shared<T> {
    id: usize,
    name: &'static str,
    value: RwLock<T>,
    subscribers: Arc<SubscriberList<T>>,
    round: AtomicU8,
}

impl<T: Clone + Send + Sync + 'static> Shared<T> {
    pub(crate) fn new(name: &'static str, initial: T) -> Self {
        let id = next_id();
        Self {
            id,
            name,
            value: RwLock::new(initial),
            subscribers: Arc::new(SubscriberList::new(id, name)),
            round: AtomicU8::new(IDLE),
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    fn read(&self) -> RwLockReadGuard<'_, T> {
        self.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.value.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self) -> T {
        self.read().clone()
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.read();
        f(&*value)
    }

    pub(crate) fn replace(&self, new_value: T) {
        self.store(new_value);
        self.notify();
    }

    /// Overwrite the value without notifying.
    pub(crate) fn store(&self, new_value: T) {
        *self.write() = new_value;
    }

    pub(crate) fn modify(&self, f: impl FnOnce(&mut T)) {
        {
            let mut value = self.write();
            f(&mut *value);
        }
        self.notify();
    }

    pub(crate) fn replace_if_changed(&self, new_value: T) -> bool
    where
        T: PartialEq,
    {
        {
            let mut value = self.write();
            if *value == new_value {
                return false;
            }
            *value = new_value;
        }
        self.notify();
        true
    }

    /// Register a listener and call it right away with the current value.
    pub(crate) fn subscribe(&self, listener: Listener<T>) -> Subscription {
        let subscription = self.observe(Arc::clone(&listener));
        let current = self.get();
        listener(&current);
        subscription
    }

    /// Register a listener that only hears about later changes.
    pub(crate) fn observe(&self, listener: Listener<T>) -> Subscription {
        let id = self.subscribers.add(listener);
        let list: Weak<dyn Detach> = Arc::downgrade(&self.subscribers) as Weak<dyn Detach>;
        Subscription::new(id, list)
    }

    /// Deliver the current value to every listener, in subscription order.
    ///
    /// Only one round runs per cell at a time. A write made while a round is
    /// running, by a listener or by another thread, does not start a second
    /// round; the running round finishes and a fresh round follows with the
    /// newer value.
    pub(crate) fn notify(&self) {
        let mut current = self.round.load(Ordering::Acquire);
        loop {
            let next = if current == IDLE { RUNNING } else { PENDING };
            match self
                .round
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        if current != IDLE {
            return;
        }
        let _round = RoundGuard(&self.round);

        loop {
            let listeners = self.subscribers.snapshot();
            let value = self.get();
            if !listeners.is_empty() {
                tracing::trace!(
                    cell = self.id,
                    cell_name = self.name,
                    listeners = listeners.len(),
                    "notifying listeners"
                );
            }
            for listener in &listeners {
                listener(&value);
            }
            // Releasing the round and checking for late writes is one step.
            if self
                .round
                .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return;
            }
            self.round.swap(RUNNING, Ordering::AcqRel);
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Ends the round if a listener panics.
struct RoundGuard<'a>(&'a AtomicU8);

impl Drop for RoundGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.store(IDLE, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn subscribe_delivers_current_value_first() {
        let cell = Shared::new("test", 7);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _sub = cell.subscribe(Arc::new(move |v: &i32| {
            seen_clone.lock().unwrap().push(*v);
        }));
        cell.replace(8);

        assert_eq!(*seen.lock().unwrap(), vec![7, 8]);
    }

    #[test]
    fn observe_skips_current_value() {
        let cell = Shared::new("test", 1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _sub = cell.observe(Arc::new(move |v: &i32| {
            seen_clone.lock().unwrap().push(*v);
        }));
        assert!(seen.lock().unwrap().is_empty());

        cell.replace(2);
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn write_from_listener_runs_a_follow_up_round() {
        let cell = Arc::new(Shared::new("test", 0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&cell);
        let _clamp = cell.observe(Arc::new(move |v: &i32| {
            if *v > 10 {
                if let Some(cell) = weak.upgrade() {
                    cell.replace(10);
                }
            }
        }));
        let seen_clone = seen.clone();
        let _record = cell.observe(Arc::new(move |v: &i32| {
            seen_clone.lock().unwrap().push(*v);
        }));

        cell.replace(42);

        assert_eq!(cell.get(), 10);
        assert_eq!(*seen.lock().unwrap(), vec![42, 10]);
    }

    #[test]
    fn unchanged_value_is_not_broadcast() {
        let cell = Shared::new("test", "a".to_string());
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = seen.clone();
        let _sub = cell.observe(Arc::new(move |_: &String| {
            *seen_clone.lock().unwrap() += 1;
        }));

        assert!(!cell.replace_if_changed("a".to_string()));
        assert!(cell.replace_if_changed("b".to_string()));
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn concurrent_writes_are_never_left_undelivered() {
        for trial in 0..200 {
            let cell = Arc::new(Shared::new("test", 0usize));
            let last_seen = Arc::new(Mutex::new(0usize));
            let last_seen_clone = last_seen.clone();
            let weak = Arc::downgrade(&cell);
            let _sub = cell.observe(Arc::new(move |_: &usize| {
                // Record the value as it is when the listener runs.
                if let Some(cell) = weak.upgrade() {
                    *last_seen_clone.lock().unwrap() = cell.get();
                }
            }));

            let writers: Vec<_> = (1..=4)
                .map(|k| {
                    let cell = cell.clone();
                    std::thread::spawn(move || {
                        for i in 0..50 {
                            cell.replace(k * 1000 + i);
                        }
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }

            assert_eq!(
                *last_seen.lock().unwrap(),
                cell.get(),
                "last write not delivered in trial {trial}"
            );
        }
    }

    #[test]
    fn panicking_listener_does_not_stall_later_rounds() {
        let cell = Shared::new("test", 0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _boom = cell.observe(Arc::new(|v: &i32| {
            if *v == 1 {
                panic!("listener failed");
            }
        }));
        let _record = cell.observe(Arc::new(move |v: &i32| {
            seen_clone.lock().unwrap().push(*v);
        }));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cell.replace(1)));
        assert!(result.is_err());

        cell.replace(2);
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn poisoned_value_lock_is_recovered() {
        let cell = Shared::new("test", vec![1]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cell.modify(|v| {
                v.push(2);
                panic!("update failed");
            })
        }));
        assert!(result.is_err());
        assert!(cell.value.is_poisoned());

        assert_eq!(cell.get(), vec![1, 2]);
        cell.replace(vec![3]);
        assert_eq!(cell.with(|v| v.clone()), vec![3]);
    }
}
