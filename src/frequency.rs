//! Frequency maps.
//!
//! A `FrequencyMap` assigns every reachable composition the exact number
//! of underlying dice-roll sequences that produce it. Dividing by
//! [`FrequencyMap::total`] gives the probability, but the map itself
//! never leaves integer arithmetic.

use crate::composition::Composition;
use crate::error::DiceError;
use crate::math;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::Rng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Exact frequencies keyed by outcome composition.
///
/// Entries iterate in ascending composition order, so two maps built from
/// the same expression always list their entries identically.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Composition, FrequencyMap};
///
/// let mut map = FrequencyMap::new();
/// map.add(Composition::single(1), 2u32);
/// map.add(Composition::single(1), 3u32);
/// map.add(Composition::single(2), 1u32);
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&Composition::single(1)), Some(&BigUint::from(5u32)));
/// assert_eq!(map.total(), BigUint::from(6u32));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    entries: BTreeMap<Composition, BigUint>,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `frequency` to the entry for `outcome`.
    ///
    /// Zero frequencies are not stored.
    pub fn add(&mut self, outcome: Composition, frequency: impl Into<BigUint>) {
        let frequency = frequency.into();
        if frequency.is_zero() {
            return;
        }
        match self.entries.entry(outcome) {
            btree_map::Entry::Occupied(mut entry) => *entry.get_mut() += frequency,
            btree_map::Entry::Vacant(entry) => {
                entry.insert(frequency);
            }
        }
    }

    /// Add every entry of `other` into this map.
    pub fn merge(&mut self, other: FrequencyMap) {
        for (outcome, frequency) in other.entries {
            self.add(outcome, frequency);
        }
    }

    pub fn get(&self, outcome: &Composition) -> Option<&BigUint> {
        self.entries.get(outcome)
    }

    pub fn contains(&self, outcome: &Composition) -> bool {
        self.entries.contains_key(outcome)
    }

    /// Number of distinct compositions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Composition, BigUint> {
        self.entries.iter()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &Composition> {
        self.entries.keys()
    }

    /// Sum of all frequencies.
    pub fn total(&self) -> BigUint {
        self.entries.values().sum()
    }

    /// The largest number of dice in any composition.
    pub fn max_dice_count(&self) -> u64 {
        self.entries
            .keys()
            .map(Composition::dice_count)
            .max()
            .unwrap_or(0)
    }

    /// Every frequency multiplied by `factor`.
    pub fn scaled(&self, factor: &BigUint) -> FrequencyMap {
        let mut scaled = FrequencyMap::new();
        for (outcome, frequency) in &self.entries {
            scaled.add(outcome.clone(), frequency * factor);
        }
        scaled
    }

    /// Collapse every composition to the sum of its faces.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use exactdice::{BigUint, Composition, FrequencyMap};
    ///
    /// let mut map = FrequencyMap::new();
    /// map.add(Composition::from_faces([1, 3]), 1u32);
    /// map.add(Composition::from_faces([2, 2]), 1u32);
    /// map.add(Composition::from_faces([1, 1]), 1u32);
    ///
    /// let sums = map.sum_distribution().unwrap();
    /// assert_eq!(sums[&4], BigUint::from(2u32));
    /// assert_eq!(sums[&2], BigUint::from(1u32));
    /// ```
    pub fn sum_distribution(&self) -> Result<BTreeMap<i64, BigUint>, DiceError> {
        let mut sums: BTreeMap<i64, BigUint> = BTreeMap::new();
        for (outcome, frequency) in &self.entries {
            *sums.entry(outcome.sum()?).or_insert_with(BigUint::zero) += frequency;
        }
        Ok(sums)
    }

    /// Draw one composition with probability proportional to its frequency.
    ///
    /// Returns `None` for an empty map.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Composition> {
        let total = self.total();
        if total.is_zero() {
            return None;
        }
        let last = BigInt::from(total) - BigInt::one();
        let target = math::random_in_range(rng, &BigInt::zero(), &last).ok()?;
        let mut target = target.to_biguint()?;
        for (outcome, frequency) in &self.entries {
            if &target < frequency {
                return Some(outcome);
            }
            target -= frequency;
        }
        None
    }

    /// Serialize to a JSON array of `{"outcome": .., "frequency": ".."}`.
    ///
    /// Frequencies are written as decimal strings so no precision is lost.
    pub fn to_json(&self) -> Result<String, DiceError> {
        serde_json::to_string(self).map_err(|e| DiceError::Serialization(e.to_string()))
    }

    /// Parse the format written by [`FrequencyMap::to_json`].
    pub fn from_json(json: &str) -> Result<Self, DiceError> {
        serde_json::from_str(json).map_err(|e| DiceError::Serialization(e.to_string()))
    }
}

impl IntoIterator for FrequencyMap {
    type Item = (Composition, BigUint);
    type IntoIter = btree_map::IntoIter<Composition, BigUint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FrequencyMap {
    type Item = (&'a Composition, &'a BigUint);
    type IntoIter = btree_map::Iter<'a, Composition, BigUint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(Composition, BigUint)> for FrequencyMap {
    fn from_iter<T: IntoIterator<Item = (Composition, BigUint)>>(iter: T) -> Self {
        let mut map = FrequencyMap::new();
        for (outcome, frequency) in iter {
            map.add(outcome, frequency);
        }
        map
    }
}

#[derive(Serialize)]
struct EntryRef<'a> {
    outcome: &'a Composition,
    frequency: String,
}

#[derive(Deserialize)]
struct Entry {
    outcome: Composition,
    frequency: String,
}

impl Serialize for FrequencyMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.entries.iter().map(|(outcome, frequency)| EntryRef {
            outcome,
            frequency: frequency.to_string(),
        }))
    }
}

impl<'de> Deserialize<'de> for FrequencyMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        let mut map = FrequencyMap::new();
        for entry in entries {
            let frequency: BigUint = entry.frequency.parse().map_err(D::Error::custom)?;
            map.add(entry.outcome, frequency);
        }
        Ok(map)
    }
}
