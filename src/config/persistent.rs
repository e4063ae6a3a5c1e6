//! Durable storage for the configuration snapshot
//!
//! The snapshot is kept as three pretty-printed JSON resources in one data
//! directory (`ingredients.json`, `recipes.json`, `glass_size.json`). Loading
//! never fails: a missing or corrupt resource is replaced by its compiled-in
//! default and reported as a [`Fallback`]. Saving stages every resource into a
//! temporary file first and only then renames them over the targets. The
//! previous targets are kept until all renames succeed, so a failed save puts
//! every file back as it was.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::snapshot::{self, ConfigSnapshot, is_starter_recipe};
use crate::constants::{glass, storage};
use crate::error::PersistenceError;
use crate::glass::GlassSize;
use crate::recipe::{Recipe, RecipeStore};
use crate::registry::SlotRegistry;
use crate::slot::{Slot, SlotNumber};
use crate::validation::{self, Composition};

/// One of the three independently stored parts of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Ingredients,
    Recipes,
    GlassSize,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Ingredients, Resource::Recipes, Resource::GlassSize];

    pub fn file_name(self) -> &'static str {
        match self {
            Resource::Ingredients => storage::INGREDIENTS_FILE,
            Resource::Recipes => storage::RECIPES_FILE,
            Resource::GlassSize => storage::GLASS_SIZE_FILE,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Ingredients => f.write_str("ingredients"),
            Resource::Recipes => f.write_str("recipes"),
            Resource::GlassSize => f.write_str("glass size"),
        }
    }
}

/// Why a resource was replaced by its default
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Missing,
    Unreadable(String),
    Corrupt(String),
}

/// A resource that could not be used as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub resource: Resource,
    pub reason: FallbackReason,
}

/// Result of a load, with every default substitution that happened
#[derive(Debug, Clone)]
pub struct Loaded {
    pub snapshot: ConfigSnapshot,
    pub fallbacks: Vec<Fallback>,
}

/// Backend that holds the configuration between sessions
pub trait Storage {
    /// Read the snapshot, substituting defaults for anything unusable
    fn load_reporting(&self) -> Loaded;

    /// Write the whole snapshot, leaving the previous one intact on failure
    fn save(&self, snapshot: &ConfigSnapshot) -> Result<(), PersistenceError>;

    fn load(&self) -> ConfigSnapshot {
        self.load_reporting().snapshot
    }
}

// ==============================================================================
// On-disk formats
// ==============================================================================

/// Slot as found on disk: a number, `"-"`, or something unusable
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredSlot {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
struct RecipeEntry {
    #[serde(default)]
    image: String,
    #[serde(default = "default_glass_size")]
    glass_size: u32,
    ingredients: Composition,
    #[serde(default, skip_serializing_if = "is_false")]
    protected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct GlassSizeFile {
    glass_size: u32,
}

fn default_glass_size() -> u32 {
    glass::DEFAULT_ML
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ==============================================================================
// Sanitizing (stored data → invariant-respecting components)
// ==============================================================================

/// Turn stored slots into a registry, unassigning anything that would break
/// slot range or uniqueness
fn ingredients_from_stored(stored: IndexMap<String, StoredSlot>) -> SlotRegistry {
    let mut taken: HashSet<SlotNumber> = HashSet::new();
    let mut pairs = Vec::with_capacity(stored.len());

    for (name, raw) in stored {
        if name.trim().is_empty() {
            warn!("Dropping ingredient with empty name");
            continue;
        }

        let slot = match raw {
            StoredSlot::Number(value) => SlotNumber::new(value).map(Slot::Assigned).unwrap_or_else(|_| {
                warn!(ingredient = %name, slot = value, "Stored slot out of range, leaving ingredient unassigned");
                Slot::Unassigned
            }),
            StoredSlot::Text(text) => text.parse::<Slot>().unwrap_or_else(|_| {
                warn!(ingredient = %name, slot = %text, "Stored slot unreadable, leaving ingredient unassigned");
                Slot::Unassigned
            }),
            StoredSlot::Other(value) => {
                warn!(ingredient = %name, slot = %value, "Stored slot unreadable, leaving ingredient unassigned");
                Slot::Unassigned
            }
        };

        let slot = match slot {
            Slot::Assigned(number) if !taken.insert(number) => {
                warn!(ingredient = %name, slot = %number, "Slot already taken by an earlier ingredient, leaving unassigned");
                Slot::Unassigned
            }
            other => other,
        };
        pairs.push((name, slot));
    }

    SlotRegistry::from_pairs(pairs)
}

fn recipes_from_stored(stored: IndexMap<String, RecipeEntry>) -> RecipeStore {
    let mut recipes = Vec::with_capacity(stored.len());

    for (name, entry) in stored {
        if name.trim().is_empty() {
            warn!("Dropping recipe with empty name");
            continue;
        }

        let mut ingredients = entry.ingredients;
        ingredients.retain(|ingredient, _| {
            let keep = !ingredient.trim().is_empty();
            if !keep {
                warn!(recipe = %name, "Dropping ingredient with empty name from recipe");
            }
            keep
        });

        if !validation::validate_percentages(&ingredients) {
            warn!(
                recipe = %name,
                total = validation::percentage_total(&ingredients),
                "Stored recipe does not add up to 100%, keeping it for editing"
            );
        }

        let glass_size = GlassSize::new(entry.glass_size).unwrap_or_else(|_| {
            warn!(
                recipe = %name,
                glass_size = entry.glass_size,
                min = glass::MIN_ML,
                max = glass::MAX_ML,
                using = glass::DEFAULT_ML,
                "Stored recipe glass size out of range, using default"
            );
            GlassSize::default()
        });

        let protected = entry.protected || is_starter_recipe(&name);
        recipes.push(Recipe::restored(name, entry.image, glass_size.get(), ingredients, protected));
    }

    RecipeStore::from_recipes(recipes)
}

fn glass_size_from_stored(stored: GlassSizeFile) -> GlassSize {
    GlassSize::new(stored.glass_size).unwrap_or_else(|_| {
        warn!(
            glass_size = stored.glass_size,
            min = glass::MIN_ML,
            max = glass::MAX_ML,
            using = glass::DEFAULT_ML,
            "Stored glass size out of range, using default"
        );
        GlassSize::default()
    })
}

fn ingredients_to_stored(registry: &SlotRegistry) -> IndexMap<&str, Slot> {
    registry.iter().collect()
}

fn recipes_to_stored(recipes: &RecipeStore) -> IndexMap<&str, RecipeEntry> {
    recipes
        .list()
        .map(|recipe| {
            let entry = RecipeEntry {
                image: recipe.image().to_string(),
                glass_size: recipe.glass_size(),
                ingredients: recipe.ingredients().clone(),
                protected: recipe.is_protected(),
            };
            (recipe.name(), entry)
        })
        .collect()
}

/// Pretty JSON with four-space indentation
fn encode<T: Serialize>(resource: Resource, value: &T) -> Result<Vec<u8>, PersistenceError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| PersistenceError::Encode {
            resource: resource.file_name(),
            source,
        })?;
    buf.push(b'\n');
    Ok(buf)
}

// ==============================================================================
// JSON directory storage
// ==============================================================================

/// Snapshot stored as JSON files in one directory
#[derive(Debug)]
pub struct JsonDirStorage {
    dir: PathBuf,
    tmp_counter: AtomicU64,
}

impl JsonDirStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// `$MIXMASTER_DATA_DIR`, else the platform data dir, else `./data`
    pub fn default_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(storage::DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        match dirs::data_dir() {
            Some(mut path) => {
                path.push(storage::APP_DIR);
                path
            }
            None => PathBuf::from(storage::FALLBACK_DATA_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, resource: Resource) -> PathBuf {
        self.dir.join(resource.file_name())
    }

    /// Parse one resource, recording why it could not be used
    fn read_resource<T: DeserializeOwned>(
        &self,
        resource: Resource,
        fallbacks: &mut Vec<Fallback>,
    ) -> Option<T> {
        let path = self.path(resource);
        let reason = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<T>(&contents) {
                Ok(value) => {
                    debug!(path = %path.display(), "Loaded resource");
                    return Some(value);
                }
                Err(e) => {
                    warn!(path = %path.display(), resource = %resource, error = %e, "Failed to parse stored resource, using defaults");
                    FallbackReason::Corrupt(e.to_string())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), resource = %resource, "No stored resource found, using defaults");
                FallbackReason::Missing
            }
            Err(e) => {
                warn!(path = %path.display(), resource = %resource, error = %e, "Failed to read stored resource, using defaults");
                FallbackReason::Unreadable(e.to_string())
            }
        };
        fallbacks.push(Fallback { resource, reason });
        None
    }

    fn tmp_path(&self, resource: Resource) -> PathBuf {
        let id = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".{}.{}.{}.{}",
            resource.file_name(),
            std::process::id(),
            id,
            storage::TMP_SUFFIX
        ))
    }

    /// Write and sync one staged file; the handle is closed before returning
    fn stage(&self, resource: Resource, data: &[u8]) -> Result<PathBuf, PersistenceError> {
        let tmp = self.tmp_path(resource);
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp)
            .map_err(|e| PersistenceError::io(&tmp, e))?;

        if let Err(e) = file.write_all(data).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&tmp);
            return Err(PersistenceError::io(&tmp, e));
        }
        Ok(tmp)
    }

    /// Keep the current content of `target` so a later rename can be undone
    fn keep_previous(&self, resource: Resource, target: &Path) -> Result<Previous, PersistenceError> {
        let meta = match fs::symlink_metadata(target) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Previous::Absent),
            Err(e) => return Err(PersistenceError::io(target, e)),
        };
        // A file cannot be renamed over a directory
        if meta.is_dir() {
            return Ok(Previous::Untouched);
        }

        let backup = self.tmp_path(resource);
        fs::hard_link(target, &backup)
            .or_else(|_| fs::copy(target, &backup).map(|_| ()))
            .map_err(|e| PersistenceError::io(&backup, e))?;
        Ok(Previous::Kept(backup))
    }

    /// Best effort: persist the renames themselves (not supported everywhere)
    fn sync_dir(&self) {
        if let Ok(dir) = fs::File::open(&self.dir) {
            let _ = dir.sync_all();
        }
    }
}

/// State of a target before the renames of one save
enum Previous {
    Absent,
    Kept(PathBuf),
    Untouched,
}

impl Previous {
    /// Put `target` back the way it was
    fn restore(&self, target: &Path) {
        let result = match self {
            Previous::Absent => fs::remove_file(target),
            Previous::Kept(backup) => fs::rename(backup, target),
            Previous::Untouched => Ok(()),
        };
        if let Err(e) = result {
            error!(path = %target.display(), error = %e, "Failed to restore previous file");
        }
    }

    fn discard(&self) {
        if let Previous::Kept(backup) = self {
            let _ = fs::remove_file(backup);
        }
    }
}

impl Storage for JsonDirStorage {
    fn load_reporting(&self) -> Loaded {
        let mut fallbacks = Vec::new();

        let ingredients = self
            .read_resource::<IndexMap<String, StoredSlot>>(Resource::Ingredients, &mut fallbacks)
            .map(ingredients_from_stored)
            .unwrap_or_else(snapshot::default_ingredients);

        let recipes = self
            .read_resource::<IndexMap<String, RecipeEntry>>(Resource::Recipes, &mut fallbacks)
            .map(recipes_from_stored)
            .unwrap_or_else(snapshot::default_recipes);

        let glass_size = self
            .read_resource::<GlassSizeFile>(Resource::GlassSize, &mut fallbacks)
            .map(glass_size_from_stored)
            .unwrap_or_default();

        info!(
            dir = %self.dir.display(),
            ingredients = ingredients.len(),
            recipes = recipes.len(),
            glass_size = glass_size.get(),
            fallbacks = fallbacks.len(),
            "Loaded station configuration"
        );

        Loaded {
            snapshot: ConfigSnapshot::new(ingredients, recipes, glass_size),
            fallbacks,
        }
    }

    fn save(&self, snapshot: &ConfigSnapshot) -> Result<(), PersistenceError> {
        // Encode everything before touching the disk
        let payloads = [
            (
                Resource::Ingredients,
                encode(Resource::Ingredients, &ingredients_to_stored(snapshot.ingredients()))?,
            ),
            (
                Resource::Recipes,
                encode(Resource::Recipes, &recipes_to_stored(snapshot.recipes()))?,
            ),
            (
                Resource::GlassSize,
                encode(
                    Resource::GlassSize,
                    &GlassSizeFile {
                        glass_size: snapshot.glass_size().get(),
                    },
                )?,
            ),
        ];

        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(payloads.len());
        for (resource, data) in &payloads {
            match self.stage(*resource, data) {
                Ok(tmp) => staged.push((tmp, self.path(*resource))),
                Err(e) => {
                    for (tmp, _) in &staged {
                        let _ = fs::remove_file(tmp);
                    }
                    return Err(e);
                }
            }
        }

        let mut previous: Vec<Previous> = Vec::with_capacity(staged.len());
        for ((_, target), (resource, _)) in staged.iter().zip(&payloads) {
            match self.keep_previous(*resource, target) {
                Ok(kept) => previous.push(kept),
                Err(e) => {
                    previous.iter().for_each(Previous::discard);
                    for (tmp, _) in &staged {
                        let _ = fs::remove_file(tmp);
                    }
                    return Err(e);
                }
            }
        }

        for (index, (tmp, target)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, target) {
                warn!(path = %target.display(), error = %e, "Failed to replace resource, restoring previous files");
                for ((_, done), kept) in staged[..index].iter().zip(&previous) {
                    kept.restore(done);
                }
                for (leftover, _) in &staged[index..] {
                    let _ = fs::remove_file(leftover);
                }
                previous.iter().for_each(Previous::discard);
                self.sync_dir();
                return Err(PersistenceError::io(target, e));
            }
        }
        previous.iter().for_each(Previous::discard);
        self.sync_dir();

        debug!(dir = %self.dir.display(), "Saved station configuration atomically");
        Ok(())
    }
}

// ==============================================================================
// In-memory storage
// ==============================================================================

/// Process-local storage for tests and front ends that do not persist
#[derive(Debug, Default)]
pub struct MemoryStorage {
    saved: Mutex<Option<ConfigSnapshot>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: ConfigSnapshot) -> Self {
        Self {
            saved: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Make every following save fail with [`PersistenceError::Unavailable`]
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Last successfully saved snapshot
    pub fn saved(&self) -> Option<ConfigSnapshot> {
        self.saved.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Storage for MemoryStorage {
    fn load_reporting(&self) -> Loaded {
        match self.saved.lock().clone() {
            Some(snapshot) => Loaded {
                snapshot,
                fallbacks: Vec::new(),
            },
            None => Loaded {
                snapshot: ConfigSnapshot::default(),
                fallbacks: Resource::ALL
                    .iter()
                    .map(|&resource| Fallback {
                        resource,
                        reason: FallbackReason::Missing,
                    })
                    .collect(),
            },
        }
    }

    fn save(&self, snapshot: &ConfigSnapshot) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable);
        }
        *self.saved.lock() = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
