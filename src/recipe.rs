//! Recipe definitions and the store that owns them
//!
//! Recipes are percentage compositions of a glass. The glass size is a
//! snapshot taken when the recipe is created, so later changes to the station
//! default leave existing recipes untouched.

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::glass::GlassSize;
use crate::validation::{self, Composition};

/// A named cocktail
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    name: String,
    image: String,
    glass_size: u32,
    ingredients: Composition,
    protected: bool,
}

impl Recipe {
    /// Built-in starter recipe, deletable by no operation
    pub(crate) fn starter(name: &str, image: &str, ingredients: &[(&str, f64)]) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            glass_size: GlassSize::default().get(),
            ingredients: ingredients.iter().map(|(n, p)| (n.to_string(), *p)).collect(),
            protected: true,
        }
    }

    /// Rebuild from storage; the loader decides protection
    pub(crate) fn restored(
        name: String,
        image: String,
        glass_size: u32,
        ingredients: Composition,
        protected: bool,
    ) -> Self {
        Self {
            name,
            image,
            glass_size,
            ingredients,
            protected,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque reference handed out by the image asset manager
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Serving volume snapshotted at creation time (ml)
    pub fn glass_size(&self) -> u32 {
        self.glass_size
    }

    pub fn ingredients(&self) -> &Composition {
        &self.ingredients
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Milliliters per ingredient for this recipe's own glass
    pub fn volumes(&self) -> IndexMap<String, f64> {
        validation::compute_volumes(&self.ingredients, self.glass_size)
    }
}

/// Owner of all recipes, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeStore {
    recipes: IndexMap<String, Recipe>,
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unprotected recipe for the given glass size
    pub fn add(
        &mut self,
        name: &str,
        image: impl Into<String>,
        ingredients: Composition,
        glass_size: GlassSize,
    ) -> Result<&Recipe, ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName("recipe"));
        }
        if self.recipes.contains_key(name) {
            return Err(ConfigError::DuplicateRecipe(name.to_string()));
        }
        validation::check_recipe(&ingredients)?;

        let recipe = Recipe {
            name: name.to_string(),
            image: image.into(),
            glass_size: glass_size.get(),
            ingredients,
            protected: false,
        };
        info!(recipe = %name, glass_size = recipe.glass_size, "Added recipe");
        Ok(self.recipes.entry(name.to_string()).or_insert(recipe))
    }

    /// Replace the composition; starter recipes stay editable
    pub fn update(&mut self, name: &str, ingredients: Composition) -> Result<&Recipe, ConfigError> {
        if !self.recipes.contains_key(name) {
            return Err(ConfigError::RecipeNotFound(name.to_string()));
        }
        validation::check_recipe(&ingredients)?;

        let recipe = self
            .recipes
            .get_mut(name)
            .ok_or_else(|| ConfigError::RecipeNotFound(name.to_string()))?;
        recipe.ingredients = ingredients;
        info!(recipe = %name, "Updated recipe");
        Ok(recipe)
    }

    /// Remove a recipe and hand it back so its image can be released
    pub fn delete(&mut self, name: &str) -> Result<Recipe, ConfigError> {
        match self.recipes.get(name) {
            None => return Err(ConfigError::RecipeNotFound(name.to_string())),
            Some(recipe) if recipe.protected => {
                warn!(recipe = %name, "Refusing to delete starter recipe");
                return Err(ConfigError::ProtectedRecipe(name.to_string()));
            }
            Some(_) => {}
        }

        let removed = self
            .recipes
            .shift_remove(name)
            .ok_or_else(|| ConfigError::RecipeNotFound(name.to_string()))?;
        info!(recipe = %name, "Deleted recipe");
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub(crate) fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        Self {
            recipes: recipes.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }
}
