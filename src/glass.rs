//! Station-wide default serving volume

use crate::constants::glass::{DEFAULT_ML, MAX_ML, MIN_ML};
use crate::error::{ConfigError, Setting};

/// Glass size in milliliters, always within `100..=1000`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlassSize(u32);

impl GlassSize {
    pub fn new(ml: u32) -> Result<Self, ConfigError> {
        if (MIN_ML..=MAX_ML).contains(&ml) {
            Ok(Self(ml))
        } else {
            Err(ConfigError::OutOfRange {
                setting: Setting::GlassSize,
                value: i64::from(ml),
                min: i64::from(MIN_ML),
                max: i64::from(MAX_ML),
            })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Replace the value; existing recipes keep their own snapshot
    pub fn set(&mut self, ml: u32) -> Result<(), ConfigError> {
        *self = Self::new(ml)?;
        Ok(())
    }
}

impl Default for GlassSize {
    fn default() -> Self {
        Self(DEFAULT_ML)
    }
}
