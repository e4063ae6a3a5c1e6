//! The persisted configuration aggregate and its compiled-in defaults

use crate::glass::GlassSize;
use crate::recipe::{Recipe, RecipeStore};
use crate::registry::SlotRegistry;
use crate::slot::{Slot, SlotNumber};

/// Names of the built-in recipes; these are always protected
pub const STARTER_RECIPES: [&str; 3] = ["Aperol Spritz", "Wildberry Lillet", "Gin Tonic"];

/// Starter ingredients and their factory slots
const STARTER_INGREDIENTS: [(&str, i64); 7] = [
    ("Aperol", 1),
    ("Lillet", 2),
    ("Schweppes Raspberry", 3),
    ("Secco", 4),
    ("Mineralwasser", 5),
    ("Gin", 6),
    ("Tonic", 7),
];

/// Everything that is loaded and saved as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    pub(crate) ingredients: SlotRegistry,
    pub(crate) recipes: RecipeStore,
    pub(crate) glass_size: GlassSize,
}

impl ConfigSnapshot {
    pub fn new(ingredients: SlotRegistry, recipes: RecipeStore, glass_size: GlassSize) -> Self {
        Self {
            ingredients,
            recipes,
            glass_size,
        }
    }

    pub fn ingredients(&self) -> &SlotRegistry {
        &self.ingredients
    }

    pub fn recipes(&self) -> &RecipeStore {
        &self.recipes
    }

    pub fn glass_size(&self) -> GlassSize {
        self.glass_size
    }
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            ingredients: default_ingredients(),
            recipes: default_recipes(),
            glass_size: GlassSize::default(),
        }
    }
}

pub fn is_starter_recipe(name: &str) -> bool {
    STARTER_RECIPES.contains(&name)
}

pub(crate) fn default_ingredients() -> SlotRegistry {
    SlotRegistry::from_pairs(STARTER_INGREDIENTS.iter().map(|(name, slot)| {
        let slot = SlotNumber::new(*slot).map(Slot::Assigned).unwrap_or_default();
        (name.to_string(), slot)
    }))
}

pub(crate) fn default_recipes() -> RecipeStore {
    RecipeStore::from_recipes([
        Recipe::starter(
            "Aperol Spritz",
            "aperol_spritz.jpg",
            &[("Aperol", 33.0), ("Secco", 50.0), ("Mineralwasser", 17.0)],
        ),
        Recipe::starter(
            "Wildberry Lillet",
            "wildberry_lillet.jpg",
            &[("Lillet", 40.0), ("Schweppes Raspberry", 60.0)],
        ),
        Recipe::starter("Gin Tonic", "gin_tonic.jpg", &[("Gin", 20.0), ("Tonic", 80.0)]),
    ])
}
