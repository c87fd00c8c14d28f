use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A star rating in half-star steps, 0.5 through 5.0.
///
/// Stored as a count of half stars (1..=10) so equality, ordering and hashing
/// stay exact. Serialized as a plain JSON number (`3.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StarRating(u8);

impl StarRating {
    pub const MAX_HALVES: u8 = 10;

    pub fn from_halves(halves: u8) -> Option<Self> {
        if (1..=Self::MAX_HALVES).contains(&halves) {
            Some(Self(halves))
        } else {
            None
        }
    }

    /// Build a rating from a number of full stars plus an optional half star.
    /// Returns `None` for zero or for anything above five stars.
    pub fn from_stars(full: u8, half: bool) -> Option<Self> {
        let halves = full.checked_mul(2)?.checked_add(u8::from(half))?;
        Self::from_halves(halves)
    }

    pub fn from_value(value: f64) -> Option<Self> {
        let halves = value * 2.0;
        if halves.fract() != 0.0 || !(0.0..=f64::from(Self::MAX_HALVES)).contains(&halves) {
            return None;
        }
        Self::from_halves(halves as u8)
    }

    pub fn halves(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Every valid rating bucket, ascending
    pub fn all() -> impl Iterator<Item = StarRating> {
        (1..=Self::MAX_HALVES).map(StarRating)
    }
}

/// Renders the way the value reads as a JSON object key: `1`, `1.5`, `5`.
impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl Serialize for StarRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

impl<'de> Deserialize<'de> for StarRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        StarRating::from_value(value).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid star rating: {}", value))
        })
    }
}
