//! The station aggregate: every configuration change goes through here
//!
//! A [`Station`] owns the loaded [`ConfigSnapshot`] and the storage it came
//! from. Each mutation validates, applies and then saves the whole snapshot.
//! If the save fails the snapshot is restored to what it was before the call,
//! so memory never runs ahead of what is on disk.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::assets::{ImageAssets, NoImageAssets};
use crate::config::{ConfigSnapshot, Fallback, Storage};
use crate::error::ConfigError;
use crate::recipe::{Recipe, RecipeStore};
use crate::registry::SlotRegistry;
use crate::slot::{Slot, SlotNumber};
use crate::validation::Composition;

/// Loaded configuration plus the storage it is written through to
pub struct Station<S: Storage> {
    config: ConfigSnapshot,
    storage: S,
    assets: Box<dyn ImageAssets + Send + Sync>,
}

impl<S: Storage> Station<S> {
    /// Load from `storage`; unusable resources are replaced by defaults
    pub fn open(storage: S) -> Self {
        Self::open_reporting(storage).0
    }

    /// Like [`Station::open`], also returning the defaults that were substituted
    pub fn open_reporting(storage: S) -> (Self, Vec<Fallback>) {
        let loaded = storage.load_reporting();
        for fallback in &loaded.fallbacks {
            warn!(resource = %fallback.resource, reason = ?fallback.reason, "Using default configuration");
        }
        let station = Self {
            config: loaded.snapshot,
            storage,
            assets: Box::new(NoImageAssets),
        };
        (station, loaded.fallbacks)
    }

    /// Use `assets` to release images of deleted recipes
    pub fn with_assets(mut self, assets: impl ImageAssets + Send + Sync + 'static) -> Self {
        self.assets = Box::new(assets);
        self
    }

    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn ingredients(&self) -> &SlotRegistry {
        &self.config.ingredients
    }

    pub fn recipes(&self) -> &RecipeStore {
        &self.config.recipes
    }

    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.config.recipes.get(name)
    }

    /// Current station default (ml)
    pub fn glass_size(&self) -> u32 {
        self.config.glass_size.get()
    }

    pub fn available_slots(&self, excluding: Option<&str>) -> Vec<SlotNumber> {
        self.config.ingredients.available_slots(excluding)
    }

    /// Milliliters per ingredient for the recipe's own glass size
    pub fn recipe_volumes(&self, name: &str) -> Result<IndexMap<String, f64>, ConfigError> {
        self.recipe(name)
            .map(Recipe::volumes)
            .ok_or_else(|| ConfigError::RecipeNotFound(name.to_string()))
    }

    pub fn register_ingredient(&mut self, name: &str, slot: Slot) -> Result<(), ConfigError> {
        self.commit(|config| config.ingredients.register(name, slot))
    }

    pub fn assign_slot(&mut self, name: &str, slot: Slot) -> Result<(), ConfigError> {
        self.commit(|config| config.ingredients.assign(name, slot))
    }

    pub fn unregister_ingredient(&mut self, name: &str) -> Result<Slot, ConfigError> {
        self.commit(|config| config.ingredients.unregister(name))
    }

    /// Add a recipe without an image
    pub fn add_recipe(&mut self, name: &str, ingredients: Composition) -> Result<(), ConfigError> {
        self.add_recipe_with_image(name, "", ingredients)
    }

    /// Add a recipe, snapshotting the current glass size into it
    pub fn add_recipe_with_image(
        &mut self,
        name: &str,
        image: &str,
        ingredients: Composition,
    ) -> Result<(), ConfigError> {
        self.commit(|config| {
            let glass_size = config.glass_size;
            config.recipes.add(name, image, ingredients, glass_size).map(|_| ())
        })
    }

    pub fn update_recipe(&mut self, name: &str, ingredients: Composition) -> Result<(), ConfigError> {
        self.commit(|config| config.recipes.update(name, ingredients).map(|_| ()))
    }

    /// Delete an unprotected recipe, then release its image
    ///
    /// The image is only released once the deletion is on disk. A failing
    /// release is logged and does not undo the deletion.
    pub fn delete_recipe(&mut self, name: &str) -> Result<Recipe, ConfigError> {
        let removed = self.commit(|config| config.recipes.delete(name))?;
        if let Err(e) = self.assets.release(removed.image()) {
            warn!(recipe = %name, image = %removed.image(), error = %e, "Failed to release recipe image");
        }
        Ok(removed)
    }

    /// Change the default for future recipes; existing ones keep theirs
    pub fn set_glass_size(&mut self, ml: u32) -> Result<(), ConfigError> {
        self.commit(|config| config.glass_size.set(ml))?;
        info!(glass_size = ml, "Changed station glass size");
        Ok(())
    }

    /// Apply `change`, then save; restore the previous state if either fails
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut ConfigSnapshot) -> Result<T, ConfigError>,
    ) -> Result<T, ConfigError> {
        let previous = self.config.clone();

        let value = match change(&mut self.config) {
            Ok(value) => value,
            Err(e) => {
                self.config = previous;
                return Err(e);
            }
        };

        if let Err(e) = self.storage.save(&self.config) {
            error!(error = %e, "Failed to save configuration, rolling back change");
            self.config = previous;
            return Err(e.into());
        }
        Ok(value)
    }
}

/// Station shared between callers; each closure runs validate → mutate →
/// persist under one lock
pub struct SharedStation<S: Storage> {
    inner: Arc<Mutex<Station<S>>>,
}

impl<S: Storage> SharedStation<S> {
    pub fn new(station: Station<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(station)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Station<S>) -> R) -> R {
        let mut station = self.inner.lock();
        f(&mut station)
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> ConfigSnapshot {
        self.inner.lock().snapshot().clone()
    }
}

impl<S: Storage> Clone for SharedStation<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
