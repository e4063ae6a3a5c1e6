//! Ingredient → dispenser slot mapping
//!
//! At most one ingredient holds a given slot. Unassigned ingredients never
//! take part in that check.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::slot::{Slot, SlotNumber};

/// Registered ingredient and where it is dispensed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    pub slot: Slot,
}

/// Owner of all ingredient registrations, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotRegistry {
    slots: IndexMap<String, Slot>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots free for `excluding` to pick (its own current slot stays selectable)
    pub fn available_slots(&self, excluding: Option<&str>) -> Vec<SlotNumber> {
        SlotNumber::all()
            .filter(|&number| match self.holder_of(number) {
                None => true,
                Some(holder) => Some(holder) == excluding,
            })
            .collect()
    }

    /// Move `ingredient` to `slot`, or clear it with [`Slot::Unassigned`]
    pub fn assign(&mut self, ingredient: &str, slot: Slot) -> Result<(), ConfigError> {
        if !self.slots.contains_key(ingredient) {
            return Err(ConfigError::IngredientNotFound(ingredient.to_string()));
        }
        self.ensure_free(ingredient, slot)?;

        if let Some(current) = self.slots.get_mut(ingredient) {
            debug!(ingredient = %ingredient, from = %current, to = %slot, "Reassigning slot");
            *current = slot;
        }
        Ok(())
    }

    /// Add a new ingredient
    pub fn register(&mut self, ingredient: &str, slot: Slot) -> Result<(), ConfigError> {
        if ingredient.trim().is_empty() {
            return Err(ConfigError::EmptyName("ingredient"));
        }
        if self.slots.contains_key(ingredient) {
            return Err(ConfigError::DuplicateIngredient(ingredient.to_string()));
        }
        self.ensure_free(ingredient, slot)?;

        info!(ingredient = %ingredient, slot = %slot, "Registered ingredient");
        self.slots.insert(ingredient.to_string(), slot);
        Ok(())
    }

    /// Remove an ingredient and free its slot
    pub fn unregister(&mut self, ingredient: &str) -> Result<Slot, ConfigError> {
        let slot = self
            .slots
            .shift_remove(ingredient)
            .ok_or_else(|| ConfigError::IngredientNotFound(ingredient.to_string()))?;
        info!(ingredient = %ingredient, slot = %slot, "Unregistered ingredient");
        Ok(slot)
    }

    pub fn slot_of(&self, ingredient: &str) -> Option<Slot> {
        self.slots.get(ingredient).copied()
    }

    /// Ingredient currently holding `number`
    pub fn holder_of(&self, number: SlotNumber) -> Option<&str> {
        self.slots
            .iter()
            .find(|(_, slot)| **slot == Slot::Assigned(number))
            .map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, ingredient: &str) -> bool {
        self.slots.contains_key(ingredient)
    }

    pub fn list(&self) -> Vec<Ingredient> {
        self.iter()
            .map(|(name, slot)| Ingredient {
                name: name.to_string(),
                slot,
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Slot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), *slot))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Build from stored pairs without conflict checks (loader sanitizes first)
    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (String, Slot)>) -> Self {
        Self {
            slots: pairs.into_iter().collect(),
        }
    }

    fn ensure_free(&self, ingredient: &str, slot: Slot) -> Result<(), ConfigError> {
        let Slot::Assigned(number) = slot else {
            return Ok(());
        };
        match self.holder_of(number) {
            Some(holder) if holder != ingredient => Err(ConfigError::SlotConflict {
                slot: number,
                holder: holder.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: i64) -> Slot {
        Slot::assigned(n).unwrap()
    }

    fn registry() -> SlotRegistry {
        let mut registry = SlotRegistry::new();
        registry.register("Gin", slot(1)).unwrap();
        registry.register("Tonic", slot(2)).unwrap();
        registry.register("Lime", Slot::Unassigned).unwrap();
        registry
    }

    fn numbers(slots: Vec<SlotNumber>) -> Vec<u8> {
        slots.into_iter().map(SlotNumber::get).collect()
    }

    #[test]
    fn test_available_slots_without_exclusion() {
        let registry = registry();
        assert_eq!(numbers(registry.available_slots(None)), vec![3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_available_slots_keeps_own_slot() {
        let registry = registry();
        assert_eq!(
            numbers(registry.available_slots(Some("Tonic"))),
            vec![2, 3, 4, 5, 6, 7, 8, 9, 10]
        );
    }

    #[test]
    fn test_available_slots_unassigned_exclusion_changes_nothing() {
        let registry = registry();
        assert_eq!(registry.available_slots(Some("Lime")), registry.available_slots(None));
    }

    #[test]
    fn test_assign_conflict() {
        let mut registry = registry();
        let err = registry.assign("Tonic", slot(1)).unwrap_err();
        match err {
            ConfigError::SlotConflict { slot, holder } => {
                assert_eq!(slot.get(), 1);
                assert_eq!(holder, "Gin");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(registry.slot_of("Tonic"), Some(Slot::assigned(2).unwrap()));
    }

    #[test]
    fn test_assign_same_slot_again_is_ok() {
        let mut registry = registry();
        registry.assign("Gin", slot(1)).unwrap();
        assert_eq!(registry.slot_of("Gin"), Some(slot(1)));
    }

    #[test]
    fn test_assign_moves_and_frees_previous_slot() {
        let mut registry = registry();
        registry.assign("Gin", slot(5)).unwrap();
        assert_eq!(registry.holder_of(SlotNumber::new(5).unwrap()), Some("Gin"));
        assert_eq!(registry.holder_of(SlotNumber::new(1).unwrap()), None);
        registry.assign("Tonic", slot(1)).unwrap();
    }

    #[test]
    fn test_unassigned_never_conflicts() {
        let mut registry = registry();
        registry.assign("Gin", Slot::Unassigned).unwrap();
        registry.assign("Tonic", Slot::Unassigned).unwrap();
        registry.register("Soda", Slot::Unassigned).unwrap();
        assert_eq!(registry.available_slots(None).len(), 10);
    }

    #[test]
    fn test_assign_unknown_ingredient() {
        let mut registry = registry();
        assert!(matches!(
            registry.assign("Rum", slot(9)),
            Err(ConfigError::IngredientNotFound(name)) if name == "Rum"
        ));
    }

    #[test]
    fn test_register_rejects_duplicates_and_empty_names() {
        let mut registry = registry();
        assert!(matches!(
            registry.register("Gin", slot(9)),
            Err(ConfigError::DuplicateIngredient(_))
        ));
        assert!(matches!(registry.register("  ", slot(9)), Err(ConfigError::EmptyName(_))));
        assert!(matches!(
            registry.register("Rum", slot(2)),
            Err(ConfigError::SlotConflict { .. })
        ));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = registry();
        registry.register("gin", slot(3)).unwrap();
        assert!(registry.contains("Gin"));
        assert!(registry.contains("gin"));
    }

    #[test]
    fn test_unregister_frees_slot() {
        let mut registry = registry();
        assert_eq!(registry.unregister("Gin").unwrap(), slot(1));
        assert!(!registry.contains("Gin"));
        assert!(registry.available_slots(None).contains(&SlotNumber::new(1).unwrap()));
        assert!(matches!(
            registry.unregister("Gin"),
            Err(ConfigError::IngredientNotFound(_))
        ));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let registry = registry();
        let names: Vec<String> = registry.list().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["Gin", "Tonic", "Lime"]);
    }

    #[test]
    fn test_uniqueness_holds_across_assign_sequence() {
        let mut registry = SlotRegistry::new();
        let names = ["A", "B", "C", "D"];
        for name in names {
            registry.register(name, Slot::Unassigned).unwrap();
        }

        // Deterministic pseudo-random walk over (ingredient, slot) pairs
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let name = names[(seed % 4) as usize];
            let target = match (seed >> 8) % 11 {
                0 => Slot::Unassigned,
                n => slot(n as i64),
            };
            let _ = registry.assign(name, target);

            let mut seen = std::collections::HashSet::new();
            for (_, current) in registry.iter() {
                if let Some(number) = current.number() {
                    assert!(seen.insert(number), "slot {number} held twice");
                }
            }
        }
    }
}
