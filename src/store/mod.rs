//! Application state for the admin UI.
//!
//! The store bundles the session flag, the current user and task, the error
//! slot, the user and task lists, and the derived list of the current user's
//! tasks.

mod config;
mod record;
mod store;

pub use config::StoreConfig;
pub use record::Record;
pub use store::{tasks_for_user, AppStore, Snapshot};
