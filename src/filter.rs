//! Dropping and keeping individual dice.
//!
//! Both filters work on sources whose compositions hold several dice,
//! such as a [`HomogeneousGroup`](crate::group::HomogeneousGroup), and
//! select dice by rank: lowest faces first from the bottom, highest
//! faces first from the top.

use crate::composition::Composition;
use crate::error::DiceError;
use crate::frequency::FrequencyMap;
use crate::source::{Dice, DistributionSource};
use std::sync::Arc;

/// Removes a fixed number of the lowest and/or highest dice.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Composition, Dice, DistributionSource};
/// use exactdice::filter::Dropper;
/// use exactdice::group::HomogeneousGroup;
/// use exactdice::leaf::Die;
///
/// let d6 = Dice::from(Die::new(6).unwrap()).shared();
/// let two_d6 = Dice::from(HomogeneousGroup::new(d6, 2).unwrap()).shared();
///
/// // Roll two, drop the lowest: a 6 survives 11 of 36 ways.
/// let best = Dropper::new(two_d6, 1, 0).frequencies().unwrap();
/// assert_eq!(best.get(&Composition::single(6)), Some(&BigUint::from(11u32)));
/// ```
#[derive(Debug, Clone)]
pub struct Dropper {
    source: Arc<Dice>,
    lowest: u64,
    highest: u64,
}

impl Dropper {
    pub fn new(source: Arc<Dice>, lowest: u64, highest: u64) -> Self {
        Self {
            source,
            lowest,
            highest,
        }
    }

    /// Drop only the `amount` lowest dice.
    pub fn lowest(source: Arc<Dice>, amount: u64) -> Self {
        Self::new(source, amount, 0)
    }

    /// Drop only the `amount` highest dice.
    pub fn highest(source: Arc<Dice>, amount: u64) -> Self {
        Self::new(source, 0, amount)
    }

    pub fn source(&self) -> &Arc<Dice> {
        &self.source
    }

    pub fn drop_lowest(&self) -> u64 {
        self.lowest
    }

    pub fn drop_highest(&self) -> u64 {
        self.highest
    }

    pub fn set_drop_lowest(&mut self, amount: u64) {
        self.lowest = amount;
    }

    pub fn set_drop_highest(&mut self, amount: u64) {
        self.highest = amount;
    }

    fn apply(&self, outcome: &Composition) -> Result<Composition, DiceError> {
        let mut remaining = outcome.clone();
        let short = remaining.remove_lowest(self.lowest) + remaining.remove_highest(self.highest);
        if short > 0 {
            return Err(overfilter(outcome, self.lowest + self.highest));
        }
        Ok(remaining)
    }
}

impl DistributionSource for Dropper {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        let input = self.source.frequencies()?;
        tracing::debug!(
            lowest = self.lowest,
            highest = self.highest,
            entries = input.len(),
            "dropping dice"
        );
        filter_map(input, |outcome| self.apply(outcome))
    }
}

/// Keeps a fixed number of the lowest and/or highest dice.
///
/// The highest dice are taken first, then the lowest from what is left,
/// so the two selections never share a die.
///
/// # Examples
///
/// ```rust
/// use exactdice::{Dice, DistributionSource};
/// use exactdice::filter::Keeper;
/// use exactdice::group::HomogeneousGroup;
/// use exactdice::leaf::Die;
///
/// let d20 = Dice::from(Die::new(20).unwrap()).shared();
/// let two_d20 = Dice::from(HomogeneousGroup::new(d20, 2).unwrap()).shared();
///
/// let advantage = Keeper::highest(two_d20, 1).unwrap();
/// assert_eq!(advantage.frequencies().unwrap().len(), 20);
///
/// let mut keeper = advantage.clone();
/// assert!(keeper.set_keep_highest(0).is_err());
/// assert_eq!(keeper.keep_highest(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Keeper {
    source: Arc<Dice>,
    lowest: u64,
    highest: u64,
}

impl Keeper {
    /// Fails if both amounts are zero.
    pub fn new(source: Arc<Dice>, lowest: u64, highest: u64) -> Result<Self, DiceError> {
        Self::validate(lowest, highest)?;
        Ok(Self {
            source,
            lowest,
            highest,
        })
    }

    pub fn lowest(source: Arc<Dice>, amount: u64) -> Result<Self, DiceError> {
        Self::new(source, amount, 0)
    }

    pub fn highest(source: Arc<Dice>, amount: u64) -> Result<Self, DiceError> {
        Self::new(source, 0, amount)
    }

    fn validate(lowest: u64, highest: u64) -> Result<(), DiceError> {
        if lowest == 0 && highest == 0 {
            return Err(DiceError::invalid("keeper", "nothing to keep"));
        }
        Ok(())
    }

    pub fn source(&self) -> &Arc<Dice> {
        &self.source
    }

    pub fn keep_lowest(&self) -> u64 {
        self.lowest
    }

    pub fn keep_highest(&self) -> u64 {
        self.highest
    }

    pub fn set_keep_lowest(&mut self, amount: u64) -> Result<(), DiceError> {
        Self::validate(amount, self.highest)?;
        self.lowest = amount;
        Ok(())
    }

    pub fn set_keep_highest(&mut self, amount: u64) -> Result<(), DiceError> {
        Self::validate(self.lowest, amount)?;
        self.highest = amount;
        Ok(())
    }

    fn apply(&self, outcome: &Composition) -> Result<Composition, DiceError> {
        let mut working = outcome.clone();
        let mut kept = Composition::new();
        let short = working.take_highest(self.highest, &mut kept)
            + working.take_lowest(self.lowest, &mut kept);
        if short > 0 {
            return Err(overfilter(outcome, self.lowest + self.highest));
        }
        Ok(kept)
    }
}

impl DistributionSource for Keeper {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        let input = self.source.frequencies()?;
        tracing::debug!(
            lowest = self.lowest,
            highest = self.highest,
            entries = input.len(),
            "keeping dice"
        );
        filter_map(input, |outcome| self.apply(outcome))
    }
}

fn overfilter(outcome: &Composition, requested: u64) -> DiceError {
    DiceError::Overfilter {
        requested,
        available: outcome.dice_count(),
    }
}

fn filter_map(
    input: FrequencyMap,
    filter: impl Fn(&Composition) -> Result<Composition, DiceError>,
) -> Result<FrequencyMap, DiceError> {
    let mut result = FrequencyMap::new();
    for (outcome, frequency) in input {
        result.add(filter(&outcome)?, frequency);
    }
    Ok(result)
}
