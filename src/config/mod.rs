//! Configuration management for the station
//!
//! - **snapshot**: the persisted aggregate and its compiled-in defaults
//! - **persistent**: durable storage backends with default fallback on load

pub mod persistent;
pub mod snapshot;

// Re-export commonly used types
pub use persistent::{Fallback, FallbackReason, JsonDirStorage, Loaded, MemoryStorage, Resource, Storage};
pub use snapshot::{ConfigSnapshot, STARTER_RECIPES, is_starter_recipe};
