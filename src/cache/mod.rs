//! Cache Module
//!
//! Named, generation-versioned response stores.

mod entry;
mod generation;
mod key;
mod stats;
mod store;


// Re-export public types
pub use entry::StoredResponse;
pub use generation::{CacheGeneration, StaticManifest};
pub use key::RequestKey;
pub use stats::AgentStats;
pub use store::{CacheStorage, MemoryStorage};
