//! Reactive cells.
//!
//! This module provides the building blocks the application state is made of:
//! - Writable cells: observable values that can be read, replaced and watched
//! - Read-only views of writable cells
//! - Derived cells: values computed from other cells and kept up to date

mod derived;
mod observable;
mod writable;

pub use derived::{create_derived, Derived, Sources};
pub use observable::Observable;
pub use writable::{create_writable, ReadOnly, Writable};
