//! Configuration core for the MixMaster cocktail station
//!
//! Maps ingredients to dispenser slots, keeps recipes as percentage
//! compositions of a glass, and writes every change through to durable
//! storage. Front ends (web form, desktop form, the `mixmaster` CLI) only call
//! into [`Station`] and render what it returns.
//!
//! ```no_run
//! use mixmaster_config::{JsonDirStorage, Station};
//!
//! let mut station = Station::open(JsonDirStorage::new(JsonDirStorage::default_dir()));
//! let mojito = [("Rum", 30.0), ("Limette", 10.0), ("Mineralwasser", 60.0)]
//!     .into_iter()
//!     .map(|(name, pct)| (name.to_string(), pct))
//!     .collect();
//! station.add_recipe("Mojito", mojito)?;
//! # Ok::<(), mixmaster_config::ConfigError>(())
//! ```

#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod constants;
pub mod error;
pub mod glass;
pub mod recipe;
pub mod registry;
pub mod slot;
pub mod station;
pub mod validation;

pub use assets::{AssetDirectory, ImageAssets, NoImageAssets};
pub use config::{ConfigSnapshot, Fallback, FallbackReason, JsonDirStorage, Loaded, MemoryStorage, Storage};
pub use error::{ConfigError, PersistenceError, Setting};
pub use glass::GlassSize;
pub use recipe::{Recipe, RecipeStore};
pub use registry::{Ingredient, SlotRegistry};
pub use slot::{Slot, SlotNumber};
pub use station::{SharedStation, Station};
pub use validation::{Composition, compute_volumes, percentage_total, validate_percentages};
