//! Stateless recipe rules: percentage totals and volume conversion

use indexmap::IndexMap;

use crate::constants::validation::{MAX_PERCENT, PERCENT_TOLERANCE, TARGET_PERCENT};
use crate::error::ConfigError;

/// Ordered ingredient name → percentage of the glass
pub type Composition = IndexMap<String, f64>;

/// Sum of all shares
pub fn percentage_total(ingredients: &Composition) -> f64 {
    ingredients.values().sum()
}

/// True iff the shares add up to 100% within the rounding tolerance
pub fn validate_percentages(ingredients: &Composition) -> bool {
    (percentage_total(ingredients) - TARGET_PERCENT).abs() < PERCENT_TOLERANCE
}

/// Convert shares into milliliters for a glass, rounded to 0.1 ml for display
pub fn compute_volumes(ingredients: &Composition, glass_size_ml: u32) -> IndexMap<String, f64> {
    ingredients
        .iter()
        .map(|(name, percentage)| {
            let ml = percentage / 100.0 * f64::from(glass_size_ml);
            (name.clone(), round_tenth(ml))
        })
        .collect()
}

/// Full check run before a composition is stored
///
/// Rejects empty ingredient names, shares outside `0..=100` (including NaN)
/// and totals off by the tolerance or more.
pub fn check_recipe(ingredients: &Composition) -> Result<(), ConfigError> {
    for (name, &value) in ingredients {
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName("ingredient"));
        }
        if !(0.0..=MAX_PERCENT).contains(&value) {
            return Err(ConfigError::InvalidPercentage {
                ingredient: name.clone(),
                value,
            });
        }
    }

    if !validate_percentages(ingredients) {
        return Err(ConfigError::InvalidPercentageSum {
            total: percentage_total(ingredients),
        });
    }
    Ok(())
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
