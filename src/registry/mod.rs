//! Registry and Sweeper
//!
//! Stores register here on construction; a background task sweeps them
//! all on a fixed interval.

mod config;
mod manager;
mod sweeper;
pub mod wait;

pub use config::RegistryConfig;
pub use manager::{Registry, Sweep};
pub(crate) use manager::WeakRegistry;
pub use sweeper::Sweeper;
