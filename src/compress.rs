//! Folding joint rolls down to a single number.
//!
//! A [`Compressor`] turns every composition of its source into one
//! scalar, for instance the total of all dice or the number of dice
//! that hit a target, and reports the distribution of that scalar as
//! single-face compositions.

use crate::composition::Composition;
use crate::error::DiceError;
use crate::frequency::FrequencyMap;
use crate::leaf::UnfairDie;
use crate::source::{Dice, DistributionSource};
use std::fmt;
use std::sync::Arc;

/// Maps one `(face, multiplicity)` pair to a scalar, or `None` on overflow.
pub type PairwiseFn = Arc<dyn Fn(i64, u64) -> Option<i64> + Send + Sync>;
/// Folds the next scalar into the running one, or `None` on overflow.
pub type AccumulateFn = Arc<dyn Fn(i64, i64) -> Option<i64> + Send + Sync>;
/// Supplies the fold's starting value.
pub type StartFn = Arc<dyn Fn() -> i64 + Send + Sync>;

/// The three functions describing how a composition folds to a scalar.
///
/// Pairs are fed to `accumulate` in an unspecified order, so it should
/// be commutative and associative; the result is otherwise not
/// guaranteed to be stable. Both functions use checked arithmetic and
/// return `None` when the value leaves `i64`, which fails the fold.
///
/// # Examples
///
/// ```rust
/// use exactdice::Composition;
/// use exactdice::compress::Compression;
///
/// let roll = Composition::from_faces([2, 2, 5]);
/// assert_eq!(Compression::sum().fold(&roll), Ok(9));
///
/// let product = Compression::sum()
///     .with_pairwise(|face, count| face.checked_pow(u32::try_from(count).ok()?))
///     .with_accumulate(i64::checked_mul)
///     .with_start(|| 1);
/// assert_eq!(product.fold(&roll), Ok(20));
/// ```
#[derive(Clone)]
pub struct Compression {
    pairwise: PairwiseFn,
    accumulate: AccumulateFn,
    start: StartFn,
}

impl Compression {
    pub fn new(pairwise: PairwiseFn, accumulate: AccumulateFn, start: StartFn) -> Self {
        Self {
            pairwise,
            accumulate,
            start,
        }
    }

    /// Sum of all dice: `face * multiplicity`, added up from 0.
    pub fn sum() -> Self {
        Self::new(
            Arc::new(|face: i64, count: u64| face.checked_mul(i64::try_from(count).ok()?)),
            Arc::new(i64::checked_add),
            Arc::new(|| 0),
        )
    }

    /// Number of dice whose face satisfies `predicate`.
    pub fn count_matching(predicate: impl Fn(i64) -> bool + Send + Sync + 'static) -> Self {
        Self::sum().with_pairwise(move |face, count| {
            if predicate(face) {
                i64::try_from(count).ok()
            } else {
                Some(0)
            }
        })
    }

    pub fn with_pairwise(
        mut self,
        pairwise: impl Fn(i64, u64) -> Option<i64> + Send + Sync + 'static,
    ) -> Self {
        self.pairwise = Arc::new(pairwise);
        self
    }

    pub fn with_accumulate(
        mut self,
        accumulate: impl Fn(i64, i64) -> Option<i64> + Send + Sync + 'static,
    ) -> Self {
        self.accumulate = Arc::new(accumulate);
        self
    }

    pub fn with_start(mut self, start: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.start = Arc::new(start);
        self
    }

    /// Fold one composition to its scalar.
    pub fn fold(&self, outcome: &Composition) -> Result<i64, DiceError> {
        outcome
            .iter()
            .try_fold((self.start)(), |acc, (face, count)| {
                (self.pairwise)(face, count).and_then(|next| (self.accumulate)(acc, next))
            })
            .ok_or_else(|| DiceError::Overflow(format!("folding {outcome}")))
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self::sum()
    }
}

impl fmt::Debug for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compression").finish_non_exhaustive()
    }
}

/// A source whose every roll is folded to one value.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Composition, Dice, DistributionSource};
/// use exactdice::compress::Compressor;
/// use exactdice::group::HomogeneousGroup;
/// use exactdice::leaf::Die;
///
/// let d6 = Dice::from(Die::new(6).unwrap()).shared();
/// let three_d6 = Dice::from(HomogeneousGroup::new(d6, 3).unwrap()).shared();
/// let total = Compressor::sum(three_d6).frequencies().unwrap();
///
/// assert_eq!(total.len(), 16);
/// assert_eq!(total.get(&Composition::single(10)), Some(&BigUint::from(27u32)));
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    source: Arc<Dice>,
    compression: Compression,
}

impl Compressor {
    pub fn new(source: Arc<Dice>, compression: Compression) -> Self {
        Self {
            source,
            compression,
        }
    }

    /// Fold to the sum of all dice.
    pub fn sum(source: Arc<Dice>) -> Self {
        Self::new(source, Compression::sum())
    }

    /// Fold to the number of dice satisfying `predicate`.
    pub fn count_matching(
        source: Arc<Dice>,
        predicate: impl Fn(i64) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(source, Compression::count_matching(predicate))
    }

    pub fn source(&self) -> &Arc<Dice> {
        &self.source
    }

    pub fn compression(&self) -> &Compression {
        &self.compression
    }

    pub fn set_compression(&mut self, compression: Compression) {
        self.compression = compression;
    }

    /// The folded distribution as a weighted die.
    pub fn to_unfair_die(&self) -> Result<UnfairDie, DiceError> {
        let mut weights = Vec::new();
        for (outcome, frequency) in self.frequencies()? {
            weights.push((outcome.sum()?, frequency));
        }
        UnfairDie::from_weights(weights)
    }

    #[cfg(not(feature = "parallel"))]
    fn fold_all(&self, input: FrequencyMap) -> Result<FrequencyMap, DiceError> {
        let mut result = FrequencyMap::new();
        for (outcome, frequency) in input {
            result.add(Composition::single(self.compression.fold(&outcome)?), frequency);
        }
        Ok(result)
    }

    #[cfg(feature = "parallel")]
    fn fold_all(&self, input: FrequencyMap) -> Result<FrequencyMap, DiceError> {
        use rayon::prelude::*;
        let entries: Vec<_> = input.into_iter().collect();
        entries
            .into_par_iter()
            .try_fold(
                FrequencyMap::new,
                |mut partial, (outcome, frequency)| -> Result<FrequencyMap, DiceError> {
                    partial.add(Composition::single(self.compression.fold(&outcome)?), frequency);
                    Ok(partial)
                },
            )
            .try_reduce(FrequencyMap::new, |mut left, right| {
                left.merge(right);
                Ok(left)
            })
    }
}

impl DistributionSource for Compressor {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        let input = self.source.frequencies()?;
        let entries = input.len();
        let result = self.fold_all(input)?;
        tracing::debug!(entries, values = result.len(), "compressed distribution");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{HomogeneousGroup, MixedGroup};
    use crate::leaf::{Die, FudgeDie};
    use num_bigint::BigUint;

    fn d(sides: i64) -> Arc<Dice> {
        Dice::from(Die::new(sides).unwrap()).shared()
    }

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_sum_matches_sum_distribution() {
        let group = Dice::from(HomogeneousGroup::new(d(6), 2).unwrap()).shared();
        let compressed = Compressor::sum(group.clone()).frequencies().unwrap();
        let expected = group.frequencies().unwrap().sum_distribution().unwrap();

        assert_eq!(compressed.len(), expected.len());
        for (value, frequency) in expected {
            assert_eq!(compressed.get(&Composition::single(value)), Some(&frequency));
        }
    }

    #[test]
    fn test_fudge_pool_sum() {
        let four_df = Dice::from(HomogeneousGroup::new(Dice::from(FudgeDie).shared(), 4).unwrap())
            .shared();
        let map = Compressor::sum(four_df).frequencies().unwrap();
        assert_eq!(map.len(), 9);
        assert_eq!(map.get(&Composition::single(0)), Some(&big(19)));
        assert_eq!(map.get(&Composition::single(4)), Some(&big(1)));
        assert_eq!(map.total(), big(81));
    }

    #[test]
    fn test_count_matching_successes() {
        let pool = Dice::from(HomogeneousGroup::new(d(6), 3).unwrap()).shared();
        let hits = Compressor::count_matching(pool, |face| face >= 5)
            .frequencies()
            .unwrap();
        // Binomial(3, 1/3) over 216
        assert_eq!(hits.get(&Composition::single(0)), Some(&big(64)));
        assert_eq!(hits.get(&Composition::single(1)), Some(&big(96)));
        assert_eq!(hits.get(&Composition::single(2)), Some(&big(48)));
        assert_eq!(hits.get(&Composition::single(3)), Some(&big(8)));
    }

    #[test]
    fn test_custom_max_fold() {
        let mixed = Dice::from(MixedGroup::new(vec![d(4), d(4)]).unwrap()).shared();
        let compression = Compression::sum()
            .with_pairwise(|face, _| Some(face))
            .with_accumulate(|acc, next| Some(acc.max(next)))
            .with_start(|| i64::MIN);
        let map = Compressor::new(mixed, compression).frequencies().unwrap();
        assert_eq!(map.get(&Composition::single(4)), Some(&big(7)));
        assert_eq!(map.get(&Composition::single(1)), Some(&big(1)));
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let top = Dice::from(Die::with_range(i64::MAX - 1, i64::MAX).unwrap()).shared();
        let pair = Dice::from(HomogeneousGroup::new(top, 2).unwrap()).shared();
        assert!(matches!(
            Compressor::sum(pair).frequencies(),
            Err(DiceError::Overflow(_))
        ));
    }

    #[test]
    fn test_custom_fold_overflow_is_an_error() {
        let product = Compression::sum()
            .with_pairwise(|face, count| face.checked_pow(u32::try_from(count).ok()?))
            .with_accumulate(i64::checked_mul)
            .with_start(|| 1);
        let roll = Composition::with_count(10, 30);
        assert!(matches!(product.fold(&roll), Err(DiceError::Overflow(_))));
        assert_eq!(product.fold(&Composition::from_faces([3, 4])), Ok(12));
    }

    #[test]
    fn test_to_unfair_die() {
        let pair = Dice::from(HomogeneousGroup::new(d(2), 2).unwrap()).shared();
        let die = Compressor::sum(pair).to_unfair_die().unwrap();
        assert_eq!(die.weights().len(), 3);
        assert_eq!(die.weights()[&3], big(2));
    }
}
