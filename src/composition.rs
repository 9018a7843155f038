//! Outcome compositions.
//!
//! A `Composition` records which face values appeared among the dice of
//! one joint roll and how many times each appeared. Order of the
//! individual dice is not kept; faces iterate in ascending order.

use crate::error::DiceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The multiset of faces produced by one joint roll.
///
/// Every stored multiplicity is at least 1; a face that is absent
/// occurred zero times. Compositions are used as frequency map keys, so
/// the public API never mutates one in place: combining operations
/// return a new value.
///
/// # Examples
///
/// ```rust
/// use exactdice::Composition;
///
/// let roll = Composition::from_faces([6, 1, 6]);
/// assert_eq!(roll.count(6), 2);
/// assert_eq!(roll.count(3), 0);
/// assert_eq!(roll.dice_count(), 3);
/// assert_eq!(roll.sum(), Ok(13));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<i64, u64>")]
pub struct Composition(BTreeMap<i64, u64>);

impl Composition {
    /// Create a composition with no dice in it.
    pub fn new() -> Self {
        Self::default()
    }

    /// A composition of one die showing `face`.
    pub fn single(face: i64) -> Self {
        Self::with_count(face, 1)
    }

    /// A composition of `multiplicity` dice all showing `face`.
    ///
    /// A zero multiplicity yields the empty composition.
    pub fn with_count(face: i64, multiplicity: u64) -> Self {
        let mut counts = BTreeMap::new();
        if multiplicity > 0 {
            counts.insert(face, multiplicity);
        }
        Self(counts)
    }

    /// Build a composition from individual die faces.
    pub fn from_faces(faces: impl IntoIterator<Item = i64>) -> Self {
        let mut counts = BTreeMap::new();
        for face in faces {
            *counts.entry(face).or_insert(0) += 1;
        }
        Self(counts)
    }

    /// Stand-in for "no dice were rolled": one die showing 0.
    ///
    /// This is indistinguishable from a real roll of 0 on one die. The
    /// indeterministic group uses it for a zero count and callers that
    /// need to tell the two apart must do so from context.
    pub fn empty_roll() -> Self {
        Self::single(0)
    }

    /// Multiplicity of `face` (0 if absent).
    pub fn count(&self, face: i64) -> u64 {
        self.0.get(&face).copied().unwrap_or(0)
    }

    /// Total number of individual dice in this composition.
    pub fn dice_count(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct faces present.
    pub fn distinct_faces(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(face, multiplicity)` pairs in ascending face order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (i64, u64)> + '_ {
        self.0.iter().map(|(&face, &count)| (face, count))
    }

    /// Distinct faces in ascending order.
    pub fn faces(&self) -> impl DoubleEndedIterator<Item = i64> + '_ {
        self.0.keys().copied()
    }

    pub fn lowest(&self) -> Option<i64> {
        self.0.keys().next().copied()
    }

    pub fn highest(&self) -> Option<i64> {
        self.0.keys().next_back().copied()
    }

    /// Sum of every die's face value.
    ///
    /// Fails with [`DiceError::Overflow`] if the total leaves `i64`.
    pub fn sum(&self) -> Result<i64, DiceError> {
        self.0.iter().try_fold(0i64, |acc, (&face, &count)| {
            i64::try_from(count)
                .ok()
                .and_then(|count| face.checked_mul(count))
                .and_then(|total| acc.checked_add(total))
                .ok_or_else(|| DiceError::Overflow(format!("sum of {self}")))
        })
    }

    /// Combine two rolls into one, adding multiplicities face by face.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use exactdice::Composition;
    ///
    /// let a = Composition::from_faces([1, 4]);
    /// let b = Composition::from_faces([4, 6]);
    /// assert_eq!(a.merge(&b), Composition::from_faces([1, 4, 4, 6]));
    /// ```
    pub fn merge(&self, other: &Composition) -> Composition {
        let mut merged = self.clone();
        merged.absorb(other, 1);
        merged
    }

    /// This roll repeated `times` times.
    pub fn repeated(&self, times: u64) -> Composition {
        if times == 0 {
            return Composition::new();
        }
        Composition(
            self.0
                .iter()
                .map(|(&face, &count)| (face, count * times))
                .collect(),
        )
    }

    /// Add `times` copies of `other` into this working value.
    pub(crate) fn absorb(&mut self, other: &Composition, times: u64) {
        if times == 0 {
            return;
        }
        for (&face, &count) in &other.0 {
            *self.0.entry(face).or_insert(0) += count * times;
        }
    }

    /// Remove up to `amount` dice starting from the lowest face.
    ///
    /// Returns how many dice could not be removed because the
    /// composition ran out.
    pub(crate) fn remove_lowest(&mut self, amount: u64) -> u64 {
        self.move_units(amount, false, None)
    }

    /// Remove up to `amount` dice starting from the highest face.
    pub(crate) fn remove_highest(&mut self, amount: u64) -> u64 {
        self.move_units(amount, true, None)
    }

    /// Move up to `amount` of the lowest dice into `into`.
    pub(crate) fn take_lowest(&mut self, amount: u64, into: &mut Composition) -> u64 {
        self.move_units(amount, false, Some(into))
    }

    /// Move up to `amount` of the highest dice into `into`.
    pub(crate) fn take_highest(&mut self, amount: u64, into: &mut Composition) -> u64 {
        self.move_units(amount, true, Some(into))
    }

    fn move_units(
        &mut self,
        mut amount: u64,
        from_top: bool,
        mut into: Option<&mut Composition>,
    ) -> u64 {
        while amount > 0 {
            let edge = if from_top { self.highest() } else { self.lowest() };
            let Some(face) = edge else {
                break;
            };
            let available = self.count(face);
            let taken = available.min(amount);
            if taken == available {
                self.0.remove(&face);
            } else if let Some(count) = self.0.get_mut(&face) {
                *count -= taken;
            }
            if let Some(target) = into.as_deref_mut() {
                *target.0.entry(face).or_insert(0) += taken;
            }
            amount -= taken;
        }
        amount
    }
}

impl TryFrom<BTreeMap<i64, u64>> for Composition {
    type Error = DiceError;

    fn try_from(counts: BTreeMap<i64, u64>) -> Result<Self, Self::Error> {
        if let Some((face, _)) = counts.iter().find(|(_, &count)| count == 0) {
            return Err(DiceError::invalid(
                "composition",
                format!("face {face} has multiplicity 0"),
            ));
        }
        Ok(Self(counts))
    }
}

impl FromIterator<i64> for Composition {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self::from_faces(iter)
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (face, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{face}x{count}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_insertion_order() {
        assert_eq!(
            Composition::from_faces([3, 1, 3]),
            Composition::from_faces([1, 3, 3])
        );
        assert_ne!(
            Composition::from_faces([1, 3]),
            Composition::from_faces([1, 3, 3])
        );
    }

    #[test]
    fn test_zero_multiplicity_is_absent() {
        let roll = Composition::with_count(5, 0);
        assert!(roll.is_empty());
        assert_eq!(roll, Composition::new());
    }

    #[test]
    fn test_repeated() {
        let roll = Composition::from_faces([2, 5]);
        assert_eq!(roll.repeated(3), Composition::from_faces([2, 2, 2, 5, 5, 5]));
        assert!(roll.repeated(0).is_empty());
    }

    #[test]
    fn test_remove_lowest_across_faces() {
        let mut roll = Composition::from_faces([1, 1, 4, 6]);
        assert_eq!(roll.remove_lowest(3), 0);
        assert_eq!(roll, Composition::single(6));

        assert_eq!(roll.remove_highest(2), 1);
        assert!(roll.is_empty());
    }

    #[test]
    fn test_take_highest_collects_units() {
        let mut roll = Composition::from_faces([2, 5, 5, 6]);
        let mut kept = Composition::new();
        assert_eq!(roll.take_highest(2, &mut kept), 0);
        assert_eq!(kept, Composition::from_faces([5, 6]));
        assert_eq!(roll, Composition::from_faces([2, 5]));
    }

    #[test]
    fn test_sum_reports_overflow() {
        assert_eq!(Composition::from_faces([-3, 5, 5]).sum(), Ok(7));
        assert_eq!(Composition::new().sum(), Ok(0));

        let near_max = Composition::from_faces([i64::MAX - 1, i64::MAX]);
        assert!(matches!(near_max.sum(), Err(DiceError::Overflow(_))));
        let many_min = Composition::with_count(i64::MIN, 2);
        assert!(matches!(many_min.sum(), Err(DiceError::Overflow(_))));
    }

    #[test]
    fn test_distinct_faces() {
        let roll = Composition::from_faces([2, 2, 5, 6, 6]);
        assert_eq!(roll.distinct_faces(), 3);
        assert_eq!(roll.dice_count(), 5);
        assert_eq!(Composition::empty_roll().distinct_faces(), 1);
    }

    #[test]
    fn test_display() {
        let roll = Composition::from_faces([-1, 3, 3]);
        assert_eq!(roll.to_string(), "{-1x1, 3x2}");
    }

    #[test]
    fn test_deserialize_rejects_zero_multiplicity() {
        let ok: Composition = serde_json::from_str(r#"{"2":1,"4":3}"#).unwrap();
        assert_eq!(ok, Composition::from_faces([2, 4, 4, 4]));

        let bad: Result<Composition, _> = serde_json::from_str(r#"{"2":0}"#);
        assert!(bad.is_err());
    }
}
