//! Dispenser slot types
//!
//! A slot is either a validated dispenser position or explicitly unassigned.
//! Unassigned is its own state, never a magic slot number, so uniqueness checks
//! only ever look at [`Slot::Assigned`] values.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::constants::slots;
use crate::error::{ConfigError, Setting};

/// Dispenser position guaranteed to lie in `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotNumber(u8);

impl SlotNumber {
    /// Validate a raw position
    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (i64::from(slots::MIN)..=i64::from(slots::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ConfigError::OutOfRange {
                setting: Setting::Slot,
                value,
                min: i64::from(slots::MIN),
                max: i64::from(slots::MAX),
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every physical position in ascending order
    pub fn all() -> impl Iterator<Item = SlotNumber> {
        (slots::MIN..=slots::MAX).map(SlotNumber)
    }
}

impl fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot state of an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    Assigned(SlotNumber),
    #[default]
    Unassigned,
}

impl Slot {
    /// Shorthand for an assigned, validated slot
    pub fn assigned(value: i64) -> Result<Self, ConfigError> {
        SlotNumber::new(value).map(Slot::Assigned)
    }

    pub fn number(self) -> Option<SlotNumber> {
        match self {
            Slot::Assigned(number) => Some(number),
            Slot::Unassigned => None,
        }
    }

    pub fn is_assigned(self) -> bool {
        matches!(self, Slot::Assigned(_))
    }
}

impl From<SlotNumber> for Slot {
    fn from(number: SlotNumber) -> Self {
        Slot::Assigned(number)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Assigned(number) => fmt::Display::fmt(number, f),
            Slot::Unassigned => f.write_str(slots::UNASSIGNED_MARKER),
        }
    }
}

/// Parses `"-"` as unassigned and anything else as a slot number
impl FromStr for Slot {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == slots::UNASSIGNED_MARKER {
            return Ok(Slot::Unassigned);
        }
        let value = trimmed.parse::<i64>().map_err(|_| ConfigError::OutOfRange {
            setting: Setting::Slot,
            value: 0,
            min: i64::from(slots::MIN),
            max: i64::from(slots::MAX),
        })?;
        Slot::assigned(value)
    }
}

/// Assigned slots are written as plain integers, unassigned ones as `"-"`
impl Serialize for Slot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Slot::Assigned(number) => serializer.serialize_u8(number.get()),
            Slot::Unassigned => serializer.serialize_str(slots::UNASSIGNED_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_number_bounds() {
        assert!(SlotNumber::new(1).is_ok());
        assert!(SlotNumber::new(10).is_ok());
        assert!(matches!(
            SlotNumber::new(0),
            Err(ConfigError::OutOfRange { setting: Setting::Slot, value: 0, .. })
        ));
        assert!(SlotNumber::new(11).is_err());
        assert!(SlotNumber::new(-3).is_err());
    }

    #[test]
    fn test_all_slots_ascending() {
        let all: Vec<u8> = SlotNumber::all().map(SlotNumber::get).collect();
        assert_eq!(all, (1..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!("-".parse::<Slot>().unwrap(), Slot::Unassigned);
        assert_eq!(" 7 ".parse::<Slot>().unwrap(), Slot::assigned(7).unwrap());
        assert!("0".parse::<Slot>().is_err());
        assert!("seven".parse::<Slot>().is_err());
    }

    #[test]
    fn test_display_matches_persisted_marker() {
        assert_eq!(Slot::Unassigned.to_string(), "-");
        assert_eq!(Slot::assigned(4).unwrap().to_string(), "4");
    }

    #[test]
    fn test_serialize_slot() {
        let assigned = serde_json::to_string(&Slot::assigned(3).unwrap()).unwrap();
        let unassigned = serde_json::to_string(&Slot::Unassigned).unwrap();
        assert_eq!(assigned, "3");
        assert_eq!(unassigned, "\"-\"");
    }

    #[test]
    fn test_unassigned_is_not_a_number() {
        assert_eq!(Slot::Unassigned.number(), None);
        assert!(!Slot::Unassigned.is_assigned());
        assert_eq!(Slot::default(), Slot::Unassigned);
    }
}
