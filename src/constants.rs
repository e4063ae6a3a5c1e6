//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the station core, providing a single source of truth for constant values.

/// Dispenser slot constants
pub mod slots {
    /// Lowest physical dispenser position
    pub const MIN: u8 = 1;

    /// Highest physical dispenser position
    pub const MAX: u8 = 10;

    /// Persisted marker for an ingredient without a dispenser position
    pub const UNASSIGNED_MARKER: &str = "-";
}

/// Glass size constants (milliliters)
pub mod glass {
    /// Smallest configurable serving volume
    pub const MIN_ML: u32 = 100;

    /// Largest configurable serving volume
    pub const MAX_ML: u32 = 1000;

    /// Serving volume used when nothing else is configured
    pub const DEFAULT_ML: u32 = 400;
}

/// Recipe validation constants
pub mod validation {
    /// Percentages of a recipe must add up to this total
    pub const TARGET_PERCENT: f64 = 100.0;

    /// Allowed deviation from the target total (absorbs float rounding)
    pub const PERCENT_TOLERANCE: f64 = 0.1;

    /// Upper bound for a single ingredient share
    pub const MAX_PERCENT: f64 = 100.0;
}

/// Durable storage layout
pub mod storage {
    /// Directory name under the platform data dir
    pub const APP_DIR: &str = "mixmaster";

    /// Environment variable overriding the data directory
    pub const DATA_DIR_ENV: &str = "MIXMASTER_DATA_DIR";

    /// Fallback data directory when the platform has none
    pub const FALLBACK_DATA_DIR: &str = "data";

    /// Assets subdirectory inside the data directory
    pub const ASSETS_DIR: &str = "assets";

    pub const INGREDIENTS_FILE: &str = "ingredients.json";
    pub const RECIPES_FILE: &str = "recipes.json";
    pub const GLASS_SIZE_FILE: &str = "glass_size.json";

    /// Suffix of staged files awaiting the atomic rename
    pub const TMP_SUFFIX: &str = "mixtmp";
}

/// Image reference naming
pub mod images {
    /// Extension used when an upload has none
    pub const DEFAULT_EXTENSION: &str = "jpg";
}
