use super::observable::delegate_observable;
use crate::runtime::{Shared, Subscription};
use std::fmt;
use std::sync::Arc;

/// An observable cell that holds a value and notifies listeners when it is
/// replaced.
///
/// Handles are cheap to clone; every clone refers to the same cell.
///
/// # Examples
///
/// ```
/// use admin_store::Writable;
/// use std::sync::{Arc, Mutex};
///
/// let count = Writable::new(1);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sub = count.subscribe({
///     let seen = seen.clone();
///     move |n| seen.lock().unwrap().push(*n)
/// });
///
/// count.set(2);
/// sub.unsubscribe();
/// count.set(3);
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// assert_eq!(count.get(), 3);
/// ```
pub struct Writable<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + Sync + 'static> Writable<T> {
    /// Create a new cell with the given initial value.
    pub fn new(initial: T) -> Self {
        Self::named("writable", initial)
    }

    /// Create a new cell whose log fields carry `name`.
    pub fn named(name: &'static str, initial: T) -> Self {
        Self {
            shared: Arc::new(Shared::new(name, initial)),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.shared.get()
    }

    /// Read the value with a function without cloning.
    ///
    /// The cell's lock is held while `f` runs, so `f` must not write to this
    /// cell; doing so deadlocks.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.shared.with(f)
    }

    /// Replace the value and notify every listener.
    pub fn set(&self, new_value: T) {
        self.shared.replace(new_value);
    }

    /// Update the value in place, then notify every listener.
    ///
    /// The cell's lock is held while `f` runs, so `f` must not read or write
    /// this cell; doing so deadlocks.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.shared.modify(f);
    }

    /// Replace the value only if it differs from the current one.
    ///
    /// Returns `true` if the value changed and listeners were notified.
    pub fn set_if_changed(&self, new_value: T) -> bool
    where
        T: PartialEq,
    {
        self.shared.replace_if_changed(new_value)
    }

    /// Send the current value to every listener again.
    pub fn notify(&self) {
        self.shared.notify();
    }

    /// Subscribe to the cell.
    ///
    /// The listener is called immediately with the current value, then after
    /// every write, until the returned guard is dropped or unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.shared.subscribe(Arc::new(listener))
    }

    /// A handle that can read and subscribe but not write.
    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of listeners currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscriber_count()
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> usize {
        self.shared.id()
    }
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Default + Clone + Send + Sync + 'static> Default for Writable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug + Clone + Send + Sync + 'static> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.shared.with(|value| {
            f.debug_struct("Writable")
                .field("name", &self.shared.name())
                .field("id", &self.shared.id())
                .field("value", value)
                .finish()
        })
    }
}

/// Read-only view of a [`Writable`].
pub struct ReadOnly<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + Sync + 'static> ReadOnly<T> {
    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.shared.get()
    }

    /// Read the value with a function without cloning.
    ///
    /// The cell's lock is held while `f` runs, so `f` must not write to this
    /// cell; doing so deadlocks.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.shared.with(f)
    }

    /// Subscribe to the underlying cell.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.shared.subscribe(Arc::new(listener))
    }
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug + Clone + Send + Sync + 'static> fmt::Debug for ReadOnly<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.shared.with(|value| {
            f.debug_struct("ReadOnly")
                .field("name", &self.shared.name())
                .field("value", value)
                .finish()
        })
    }
}

delegate_observable!(Writable, shared);
delegate_observable!(ReadOnly, shared);

/// Create a new writable cell.
///
/// # Example
///
/// ```
/// use admin_store::create_writable;
///
/// let flag = create_writable(false);
/// flag.set(true);
/// assert!(flag.get());
/// ```
pub fn create_writable<T>(initial: T) -> Writable<T>
where
    T: Clone + Send + Sync + 'static,
{
    Writable::new(initial)
}
