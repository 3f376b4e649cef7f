use super::observable::{delegate_observable, observe_any, Observable};
use crate::runtime::{Shared, Subscription};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A tuple of cells a [`Derived`] value is computed from.
///
/// Implemented for tuples of one to four [`Observable`]s. The derive function
/// receives a tuple holding a clone of each source's current value.
pub trait Sources: Clone + Send + Sync + 'static {
    /// Current values of the sources, in tuple order.
    type Values;

    /// Read every source.
    fn values(&self) -> Self::Values;

    /// Call `on_change` whenever any source changes.
    #[doc(hidden)]
    fn observe(&self, on_change: &Arc<dyn Fn() + Send + Sync>) -> Vec<Subscription>;
}

macro_rules! impl_sources {
    ($($source:ident => $idx:tt),+) => {
        impl<$($source: Observable),+> Sources for ($($source,)+) {
            type Values = ($($source::Value,)+);

            fn values(&self) -> Self::Values {
                ($(self.$idx.get(),)+)
            }

            fn observe(&self, on_change: &Arc<dyn Fn() + Send + Sync>) -> Vec<Subscription> {
                vec![$(observe_any(&self.$idx, on_change)),+]
            }
        }
    };
}

impl_sources!(A => 0);
impl_sources!(A => 0, B => 1);
impl_sources!(A => 0, B => 1, C => 2);
impl_sources!(A => 0, B => 1, C => 2, D => 3);

struct DerivedInner<T> {
    shared: Shared<T>,
    recomputes: AtomicUsize,
    // Held while reading the sources and storing the result, so the last
    // stored value is never older than the last source write.
    recompute: Mutex<()>,
    // Dropped together with the last handle, which detaches from the sources.
    sources: Mutex<Vec<Subscription>>,
}

/// A read-only cell computed from other cells.
///
/// The value is computed eagerly on creation. Whenever a source changes, the
/// derive function runs again and the new value is sent to this cell's
/// listeners before the source moves on to its next listener.
///
/// # Examples
///
/// ```
/// use admin_store::{Derived, Writable};
///
/// let width = Writable::new(3);
/// let height = Writable::new(4);
/// let area = Derived::new((width.clone(), height.clone()), |(w, h)| w * h);
///
/// assert_eq!(area.get(), 12);
/// width.set(5);
/// assert_eq!(area.get(), 20);
/// ```
pub struct Derived<T> {
    inner: Arc<DerivedInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Derived<T> {
    /// Create a derived cell from `sources` and a pure derive function.
    pub fn new<S, F>(sources: S, derive: F) -> Self
    where
        S: Sources,
        F: Fn(S::Values) -> T + Send + Sync + 'static,
    {
        Self::named("derived", sources, derive)
    }

    /// Create a derived cell whose log fields carry `name`.
    pub fn named<S, F>(name: &'static str, sources: S, derive: F) -> Self
    where
        S: Sources,
        F: Fn(S::Values) -> T + Send + Sync + 'static,
    {
        let initial = derive(sources.values());
        let inner = Arc::new(DerivedInner {
            shared: Shared::new(name, initial),
            recomputes: AtomicUsize::new(0),
            recompute: Mutex::new(()),
            sources: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&inner);
        let source_handles = sources.clone();
        let on_change: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let _recompute = inner
                    .recompute
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                inner.shared.store(derive(source_handles.values()));
            }
            let recomputes = inner.recomputes.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::debug!(
                cell = inner.shared.id(),
                cell_name = inner.shared.name(),
                recomputes,
                "derived value recomputed"
            );
            inner.shared.notify();
        });

        let guards = sources.observe(&on_change);
        *inner
            .sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = guards;

        Self { inner }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.shared.get()
    }

    /// Read the value with a function without cloning.
    ///
    /// The value's lock is held while `f` runs, so `f` must not write to a
    /// source of this cell; the recomputation would deadlock.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.shared.with(f)
    }

    /// Subscribe to the derived value.
    ///
    /// The listener is called immediately with the current value, then after
    /// every recomputation.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.shared.subscribe(Arc::new(listener))
    }

    /// How many times the value was recomputed after creation.
    pub fn recompute_count(&self) -> usize {
        self.inner.recomputes.load(Ordering::SeqCst)
    }

    /// Number of listeners currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.inner.shared.subscriber_count()
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> usize {
        self.inner.shared.id()
    }
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug + Clone + Send + Sync + 'static> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.shared.with(|value| {
            f.debug_struct("Derived")
                .field("name", &self.inner.shared.name())
                .field("id", &self.inner.shared.id())
                .field("recomputes", &self.recompute_count())
                .field("value", value)
                .finish()
        })
    }
}

delegate_observable!(Derived, inner.shared);

/// Create a new derived cell.
///
/// # Example
///
/// ```
/// use admin_store::{create_derived, create_writable};
///
/// let count = create_writable(5);
/// let doubled = create_derived((count.clone(),), |(n,)| n * 2);
/// assert_eq!(doubled.get(), 10);
/// ```
pub fn create_derived<T, S, F>(sources: S, derive: F) -> Derived<T>
where
    T: Clone + Send + Sync + 'static,
    S: Sources,
    F: Fn(S::Values) -> T + Send + Sync + 'static,
{
    Derived::new(sources, derive)
}
