//! # admin-store
//!
//! Reactive state for a small administrative web application.
//!
//! The crate provides two levels of abstraction:
//!
//! ## Cells (low-level primitives)
//!
//! - `Writable<T>` - Observable values that notify listeners when replaced
//! - `ReadOnly<T>` - A view of a writable cell without write access
//! - `Derived<T>` - Values computed from other cells, recomputed on change
//!
//! Every listener is called once with the current value when it subscribes
//! and again after each change, in subscription order. Dropping the returned
//! `Subscription` unsubscribes it.
//!
//! ## Store (application state)
//!
//! `AppStore` holds the session flag, the current user and task, an error
//! slot, the user and task lists, and `user_tasks`: the tasks whose `"user"`
//! field matches the current user's `"email"`.
//!
//! ```
//! use admin_store::{AppStore, Record};
//!
//! let store = AppStore::new();
//! store.user.set(Some(Record::new().with("email", "a@x")));
//! store.tasks.set(vec![
//!     Record::new().with("user", "a@x"),
//!     Record::new().with("user", "b@x"),
//! ]);
//!
//! assert_eq!(store.user_tasks.get(), vec![Record::new().with("user", "a@x")]);
//! ```

pub mod error;
pub mod runtime;
pub mod signal;
pub mod store;

// Re-export main types for convenience
pub use error::{Result, StoreError};
pub use runtime::{SubscriberId, Subscription};
pub use signal::{create_derived, create_writable, Derived, Observable, ReadOnly, Sources, Writable};
pub use store::{tasks_for_user, AppStore, Record, Snapshot, StoreConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let flag = create_writable(false);
        assert!(!flag.get());
        flag.set(true);
        assert!(flag.get());
    }
}
