//! Storage Engine
//!
//! In-memory key-value store with lazily evaluated expiry, plus an
//! expiring set built on top of it.

mod entry;
mod options;
mod set;
mod store;

pub use entry::{ExpiresAt, ReferenceTime};
pub use options::{ExpiryHook, StoreOptions, FOREVER};
pub use set::Set;
pub use store::Store;
