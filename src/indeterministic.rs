//! Rolling a random number of dice.
//!
//! The number of dice is itself read from a distribution, e.g. "roll
//! 1d4, then roll that many d6".

use crate::composition::Composition;
use crate::error::DiceError;
use crate::frequency::FrequencyMap;
use crate::group;
use crate::source::{Dice, DistributionSource};
use std::sync::Arc;

/// A group of `source` dice whose size is drawn from `count`.
///
/// `count` is read as a scalar distribution: each of its compositions
/// contributes the sum of its faces as a die count (for a single die or
/// a [`Compressor`](crate::compress::Compressor) that is just its value).
///
/// A count of 0 maps to [`Composition::empty_roll`], which looks the same
/// as one die showing 0. Negative counts roll their absolute value.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Dice, DistributionSource};
/// use exactdice::indeterministic::IndeterministicGroup;
/// use exactdice::leaf::Die;
///
/// let d2 = Dice::from(Die::new(2).unwrap()).shared();
/// let d6 = Dice::from(Die::new(6).unwrap()).shared();
///
/// // Roll 1d2 to decide between 1d6 and 2d6.
/// let map = IndeterministicGroup::new(d6, d2).frequencies().unwrap();
/// assert_eq!(map.total(), BigUint::from(6u32 + 36));
/// ```
#[derive(Debug, Clone)]
pub struct IndeterministicGroup {
    source: Arc<Dice>,
    count: Arc<Dice>,
}

impl IndeterministicGroup {
    pub fn new(source: Arc<Dice>, count: Arc<Dice>) -> Self {
        Self { source, count }
    }

    pub fn source(&self) -> &Arc<Dice> {
        &self.source
    }

    /// The distribution the number of dice is drawn from.
    pub fn count(&self) -> &Arc<Dice> {
        &self.count
    }

    pub fn set_source(&mut self, source: Arc<Dice>) {
        self.source = source;
    }

    pub fn set_count(&mut self, count: Arc<Dice>) {
        self.count = count;
    }
}

impl DistributionSource for IndeterministicGroup {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        let counts = self.count.frequencies()?.sum_distribution()?;
        let base = self.source.frequencies()?;
        tracing::debug!(
            counts = counts.len(),
            base_entries = base.len(),
            "rolling an indeterminate number of dice"
        );

        let mut result = FrequencyMap::new();
        for (count, weight) in counts {
            if count == 0 {
                result.add(Composition::empty_roll(), weight);
                continue;
            }
            let dice = u32::try_from(count.unsigned_abs()).map_err(|_| {
                DiceError::invalid("indeterministic group", format!("{count} dice"))
            })?;
            let rolled = group::replicate(&base, dice)?;
            result.merge(rolled.scaled(&weight));
        }
        Ok(result)
    }
}
