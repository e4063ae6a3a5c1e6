//! Error types for station configuration
//!
//! Every failure is a local, recoverable condition returned to the caller.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::slot::SlotNumber;

/// Which bounded setting an [`ConfigError::OutOfRange`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Slot,
    GlassSize,
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Slot => f.write_str("slot"),
            Setting::GlassSize => f.write_str("glass size"),
        }
    }
}

/// Rejected mutation or failed persistence
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("slot {slot} is already used by '{holder}'")]
    SlotConflict { slot: SlotNumber, holder: String },

    #[error("{setting} {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        setting: Setting,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("recipe '{0}' already exists")]
    DuplicateRecipe(String),

    #[error("recipe '{0}' not found")]
    RecipeNotFound(String),

    #[error("percentages must add up to 100% (current total: {total:.1}%)")]
    InvalidPercentageSum { total: f64 },

    #[error("percentage {value} for '{ingredient}' must lie between 0 and 100")]
    InvalidPercentage { ingredient: String, value: f64 },

    #[error("recipe '{0}' is a starter recipe and cannot be deleted")]
    ProtectedRecipe(String),

    #[error("ingredient '{0}' already exists")]
    DuplicateIngredient(String),

    #[error("ingredient '{0}' not found")]
    IngredientNotFound(String),

    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Failure while writing the configuration snapshot
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {resource}: {source}")]
    Encode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage is not accepting writes")]
    Unavailable,
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_sum_message_shows_one_decimal() {
        let err = ConfigError::InvalidPercentageSum { total: 95.04 };
        assert_eq!(
            err.to_string(),
            "percentages must add up to 100% (current total: 95.0%)"
        );
    }

    #[test]
    fn test_out_of_range_message() {
        let err = ConfigError::OutOfRange {
            setting: Setting::GlassSize,
            value: 50,
            min: 100,
            max: 1000,
        };
        assert_eq!(err.to_string(), "glass size 50 is outside the allowed range 100..=1000");
    }

    #[test]
    fn test_persistence_error_is_transparent() {
        let err: ConfigError = PersistenceError::Unavailable.into();
        assert_eq!(err.to_string(), "storage is not accepting writes");
    }
}
