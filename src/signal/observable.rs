use crate::runtime::{Listener, Subscription};
use std::sync::Arc;

mod private {
    pub trait Sealed {}
}

pub(crate) use private::Sealed;

/// Anything that holds a value and notifies listeners when it changes.
///
/// Implemented by [`Writable`](crate::Writable), [`ReadOnly`](crate::ReadOnly)
/// and [`Derived`](crate::Derived). Any of them can feed a derived cell.
pub trait Observable: Sealed + Clone + Send + Sync + 'static {
    /// The type of value the cell holds.
    type Value: Clone + Send + Sync + 'static;

    /// Unique ID of the underlying cell (shared by all of its handles).
    fn id(&self) -> usize;

    /// Name used in log fields.
    fn name(&self) -> &'static str;

    /// Get a clone of the current value.
    fn get(&self) -> Self::Value;

    /// Read the value with a function without cloning.
    ///
    /// The cell's lock is held while `f` runs; `f` must not write to it.
    fn with<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> R;

    /// Subscribe a listener.
    ///
    /// The listener is called immediately with the current value and then
    /// after every change, until the returned guard is dropped.
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Self::Value) + Send + Sync + 'static;

    /// Number of listeners currently registered.
    fn subscriber_count(&self) -> usize;

    /// Register a listener for later changes only.
    #[doc(hidden)]
    fn observe_changes(&self, listener: Listener<Self::Value>) -> Subscription;
}

/// Implements [`Observable`] for a handle type by delegating to its `Shared`
/// state, reached through the given field path.
macro_rules! delegate_observable {
    ($handle:ident, $($path:ident).+) => {
        impl<T: Clone + Send + Sync + 'static> $crate::signal::observable::Sealed for $handle<T> {}

        impl<T: Clone + Send + Sync + 'static> $crate::signal::Observable for $handle<T> {
            type Value = T;

            fn id(&self) -> usize {
                self.$($path).+.id()
            }

            fn name(&self) -> &'static str {
                self.$($path).+.name()
            }

            fn get(&self) -> T {
                self.$($path).+.get()
            }

            fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
                self.$($path).+.with(f)
            }

            fn subscribe<F>(&self, listener: F) -> $crate::runtime::Subscription
            where
                F: Fn(&T) + Send + Sync + 'static,
            {
                self.$($path).+.subscribe(std::sync::Arc::new(listener))
            }

            fn subscriber_count(&self) -> usize {
                self.$($path).+.subscriber_count()
            }

            fn observe_changes(
                &self,
                listener: $crate::runtime::Listener<T>,
            ) -> $crate::runtime::Subscription {
                self.$($path).+.observe(listener)
            }
        }
    };
}

pub(crate) use delegate_observable;

/// Subscribe `on_change` to later changes of `source`, ignoring the value.
pub(crate) fn observe_any<S: Observable>(
    source: &S,
    on_change: &Arc<dyn Fn() + Send + Sync>,
) -> Subscription {
    let on_change = Arc::clone(on_change);
    source.observe_changes(Arc::new(move |_: &S::Value| on_change()))
}
