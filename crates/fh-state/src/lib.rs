//! fh-state: Durable balance storage
//!
//! Every game reads and writes the same balance key through a
//! [`BalanceStore`]. Two implementations ship here:
//! - [`MemoryStore`] for tests, simulations and headless play
//! - [`JsonFileStore`] for a JSON document on disk (platform data dir by default)

mod error;
mod file_store;
mod store;

pub use error::*;
pub use file_store::*;
pub use store::*;
