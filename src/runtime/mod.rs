//! Runtime support for reactive cells.
//!
//! This module provides the state every cell handle shares, the ordered
//! listener registry and the RAII guard returned by `subscribe`.

mod cell;
mod subscribers;

pub(crate) use cell::Shared;
pub use subscribers::{Listener, SubscriberId, Subscription};
