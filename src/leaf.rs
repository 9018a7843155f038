//! Leaf dice.
//!
//! The single-die sources every expression bottoms out in. Each one
//! produces single-face compositions of multiplicity 1.

use crate::composition::Composition;
use crate::error::DiceError;
use crate::frequency::FrequencyMap;
use crate::source::DistributionSource;
use num_bigint::BigUint;
use num_traits::Zero;
use std::collections::BTreeMap;

/// Number of faces `0, step, 2 * step, ...` within a span, if it fits a `usize`.
fn face_count(span: u64, step: u64) -> Option<u64> {
    let count = (span / step).checked_add(1)?;
    usize::try_from(count).ok()?;
    Some(count)
}

/// A fair die over the contiguous faces `min..=max`.
///
/// # Examples
///
/// ```rust
/// use exactdice::leaf::Die;
///
/// let d20 = Die::new(20).unwrap();
/// assert_eq!((d20.min(), d20.max()), (1, 20));
///
/// let d0_9 = Die::with_range(0, 9).unwrap();
/// assert_eq!(d0_9.sides(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Die {
    min: i64,
    max: i64,
}

impl Die {
    /// A die numbered `1..=sides`.
    pub fn new(sides: i64) -> Result<Self, DiceError> {
        if sides < 1 {
            return Err(DiceError::invalid("die", format!("{sides} sides")));
        }
        Ok(Self { min: 1, max: sides })
    }

    /// A die numbered `min..=max`.
    ///
    /// Fails if the range is empty or has more faces than a `usize` can count.
    pub fn with_range(min: i64, max: i64) -> Result<Self, DiceError> {
        if min > max {
            return Err(DiceError::invalid("die", format!("range {min}..={max} is empty")));
        }
        if face_count(min.abs_diff(max), 1).is_none() {
            return Err(DiceError::invalid("die", format!("range {min}..={max} is too wide")));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn sides(&self) -> u64 {
        self.min.abs_diff(self.max) + 1
    }
}

impl DistributionSource for Die {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        Ok((self.min..=self.max)
            .map(|face| (Composition::single(face), BigUint::from(1u32)))
            .collect())
    }

    fn distinct_values(&self) -> Option<usize> {
        Some(self.sides() as usize)
    }
}

/// The three-valued fudge die: -1, 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FudgeDie;

impl FudgeDie {
    pub const MIN: i64 = -1;
    pub const MAX: i64 = 1;
}

impl DistributionSource for FudgeDie {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        Ok((Self::MIN..=Self::MAX)
            .map(|face| (Composition::single(face), BigUint::from(1u32)))
            .collect())
    }

    fn distinct_values(&self) -> Option<usize> {
        Some(3)
    }
}

/// A die with arbitrary faces and integer weights.
///
/// # Examples
///
/// ```rust
/// use exactdice::leaf::UnfairDie;
/// use exactdice::{BigUint, DistributionSource};
///
/// // A d6 where the 6 is twice as likely.
/// let loaded = UnfairDie::from_weights([(1, 1u32), (2, 1), (3, 1), (4, 1), (5, 1), (6, 2)]).unwrap();
/// assert_eq!(loaded.frequencies().unwrap().total(), BigUint::from(7u32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfairDie {
    weights: BTreeMap<i64, BigUint>,
}

impl UnfairDie {
    /// Build from `face -> weight`.
    ///
    /// Fails if there are no faces or any weight is zero.
    pub fn new(weights: BTreeMap<i64, BigUint>) -> Result<Self, DiceError> {
        if weights.is_empty() {
            return Err(DiceError::invalid("unfair die", "no faces"));
        }
        if let Some((face, _)) = weights.iter().find(|(_, weight)| weight.is_zero()) {
            return Err(DiceError::invalid(
                "unfair die",
                format!("face {face} has weight 0"),
            ));
        }
        Ok(Self { weights })
    }

    /// Build from `(face, weight)` pairs; repeated faces add up.
    pub fn from_weights<W: Into<BigUint>>(
        weights: impl IntoIterator<Item = (i64, W)>,
    ) -> Result<Self, DiceError> {
        let mut merged: BTreeMap<i64, BigUint> = BTreeMap::new();
        for (face, weight) in weights {
            *merged.entry(face).or_insert_with(BigUint::zero) += weight.into();
        }
        Self::new(merged)
    }

    pub fn weights(&self) -> &BTreeMap<i64, BigUint> {
        &self.weights
    }

    pub fn min(&self) -> i64 {
        self.weights.keys().next().copied().unwrap_or_default()
    }

    pub fn max(&self) -> i64 {
        self.weights.keys().next_back().copied().unwrap_or_default()
    }
}

impl DistributionSource for UnfairDie {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        Ok(self
            .weights
            .iter()
            .map(|(&face, weight)| (Composition::single(face), weight.clone()))
            .collect())
    }

    fn distinct_values(&self) -> Option<usize> {
        Some(self.weights.len())
    }
}

/// A fair die over `start, start + step, ...` up to `end`.
///
/// # Examples
///
/// ```rust
/// use exactdice::leaf::RangeDie;
///
/// let mut tens = RangeDie::new(0, 90, 10).unwrap();
/// assert_eq!(tens.faces().count(), 10);
///
/// assert!(tens.set_step(0).is_err());
/// assert_eq!(tens.step(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeDie {
    start: i64,
    end: i64,
    step: i64,
}

impl RangeDie {
    pub fn new(start: i64, end: i64, step: i64) -> Result<Self, DiceError> {
        Self::validate(start, end, step)?;
        Ok(Self { start, end, step })
    }

    fn validate(start: i64, end: i64, step: i64) -> Result<(), DiceError> {
        if step < 1 {
            return Err(DiceError::invalid("range die", format!("step {step}")));
        }
        if start > end {
            return Err(DiceError::invalid(
                "range die",
                format!("start {start} is after end {end}"),
            ));
        }
        if face_count(start.abs_diff(end), step.unsigned_abs()).is_none() {
            return Err(DiceError::invalid(
                "range die",
                format!("{start}..={end} by {step} has too many faces"),
            ));
        }
        Ok(())
    }

    /// Change the step, keeping the old one on failure.
    pub fn set_step(&mut self, step: i64) -> Result<(), DiceError> {
        Self::validate(self.start, self.end, step)?;
        self.step = step;
        Ok(())
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Faces in ascending order.
    pub fn faces(&self) -> impl Iterator<Item = i64> {
        let step = self.step.unsigned_abs();
        let count = face_count(self.start.abs_diff(self.end), step).unwrap_or(0);
        let start = self.start;
        // every offset is at most `end - start`, so the face stays in range
        (0..count).map(move |i| start.wrapping_add_unsigned(step * i))
    }

    /// Largest reachable face, which may be below `end`.
    pub fn max(&self) -> i64 {
        self.faces().last().unwrap_or(self.start)
    }
}

impl DistributionSource for RangeDie {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        Ok(self
            .faces()
            .map(|face| (Composition::single(face), BigUint::from(1u32)))
            .collect())
    }

    fn distinct_values(&self) -> Option<usize> {
        Some(self.faces().count())
    }
}
