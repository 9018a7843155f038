//! Grouping many dice into one joint roll.
//!
//! [`HomogeneousGroup`] rolls N independent copies of one source;
//! [`MixedGroup`] rolls a list of possibly different sources together.
//! Both keep every individual die in the resulting compositions.

use crate::composition::Composition;
use crate::error::DiceError;
use crate::frequency::FrequencyMap;
use crate::math;
use crate::source::{Dice, DistributionSource};
use num_bigint::BigUint;
use std::sync::Arc;

/// N independent rolls of the same source.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Composition, Dice, DistributionSource};
/// use exactdice::group::HomogeneousGroup;
/// use exactdice::leaf::Die;
///
/// let d6 = Dice::from(Die::new(6).unwrap()).shared();
/// let two_d6 = HomogeneousGroup::new(d6, 2).unwrap();
/// let map = two_d6.frequencies().unwrap();
///
/// // A pair of 3s can only be rolled one way, a 3 and a 4 two ways.
/// assert_eq!(map.get(&Composition::from_faces([3, 3])), Some(&BigUint::from(1u32)));
/// assert_eq!(map.get(&Composition::from_faces([3, 4])), Some(&BigUint::from(2u32)));
/// ```
#[derive(Debug, Clone)]
pub struct HomogeneousGroup {
    source: Arc<Dice>,
    count: u32,
}

impl HomogeneousGroup {
    /// Group `count` copies of `source`. `count` must be at least 1.
    pub fn new(source: Arc<Dice>, count: u32) -> Result<Self, DiceError> {
        Self::validate_count(count)?;
        Ok(Self { source, count })
    }

    fn validate_count(count: u32) -> Result<(), DiceError> {
        if count == 0 {
            return Err(DiceError::invalid("group", "count must be at least 1"));
        }
        Ok(())
    }

    pub fn source(&self) -> &Arc<Dice> {
        &self.source
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Change the number of dice, keeping the old count on failure.
    pub fn set_count(&mut self, count: u32) -> Result<(), DiceError> {
        Self::validate_count(count)?;
        self.count = count;
        Ok(())
    }

    pub fn set_source(&mut self, source: Arc<Dice>) {
        self.source = source;
    }
}

impl DistributionSource for HomogeneousGroup {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        let base = self.source.frequencies()?;
        tracing::debug!(
            count = self.count,
            domain = ?self.source.distinct_values(),
            base_entries = base.len(),
            "grouping identical dice"
        );
        replicate(&base, self.count)
    }
}

/// Joint distribution of `count` independent draws from `base`.
///
/// Walks every multiset of `count` entries of `base` exactly once; each
/// multiset is weighted by the number of dice orders that produce it
/// times the product of the chosen entries' own frequencies.
pub(crate) fn replicate(base: &FrequencyMap, count: u32) -> Result<FrequencyMap, DiceError> {
    let entries: Vec<(&Composition, &BigUint)> = base.iter().collect();
    let mut result = FrequencyMap::new();
    if entries.is_empty() || count == 0 {
        return Ok(result);
    }

    let mut odometer = Multisets::new(entries.len(), count as usize);
    let mut histogram = vec![0u32; entries.len()];
    while let Some(digits) = odometer.current() {
        histogram.iter_mut().for_each(|h| *h = 0);
        for &digit in digits {
            histogram[digit] += 1;
        }

        let mut outcome = Composition::new();
        let mut weight = BigUint::from(1u32);
        let mut groups = Vec::with_capacity(entries.len());
        for (index, &times) in histogram.iter().enumerate() {
            if times == 0 {
                continue;
            }
            let (composition, frequency) = entries[index];
            outcome.absorb(composition, times as u64);
            weight *= frequency.pow(times);
            groups.push(times as i64);
        }
        weight *= math::multinomial_complete(count as i64, &groups)?;
        result.add(outcome, weight);

        odometer.advance();
    }

    Ok(result)
}

/// Odometer over non-decreasing digit sequences.
///
/// Every digit is at least the one before it, so each multiset of
/// `length` values from `0..radix` is visited once, in lexicographic
/// order.
struct Multisets {
    digits: Vec<usize>,
    radix: usize,
    done: bool,
}

impl Multisets {
    fn new(radix: usize, length: usize) -> Self {
        Self {
            digits: vec![0; length],
            radix,
            done: radix == 0,
        }
    }

    fn current(&self) -> Option<&[usize]> {
        (!self.done).then_some(self.digits.as_slice())
    }

    fn advance(&mut self) {
        let Some(position) = self.digits.iter().rposition(|&d| d + 1 < self.radix) else {
            self.done = true;
            return;
        };
        let next = self.digits[position] + 1;
        for digit in &mut self.digits[position..] {
            *digit = next;
        }
    }
}

/// Independent rolls of a list of sources, which may differ.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Dice, DistributionSource};
/// use exactdice::group::MixedGroup;
/// use exactdice::leaf::Die;
///
/// let d4 = Dice::from(Die::new(4).unwrap()).shared();
/// let d6 = Dice::from(Die::new(6).unwrap()).shared();
/// let mixed = MixedGroup::new(vec![d4, d6]).unwrap();
///
/// assert_eq!(mixed.frequencies().unwrap().total(), BigUint::from(24u32));
/// ```
#[derive(Debug, Clone)]
pub struct MixedGroup {
    sources: Vec<Arc<Dice>>,
}

impl MixedGroup {
    /// Fails if `sources` is empty.
    pub fn new(sources: Vec<Arc<Dice>>) -> Result<Self, DiceError> {
        if sources.is_empty() {
            return Err(DiceError::invalid("mixed group", "no sources"));
        }
        Ok(Self { sources })
    }

    pub fn sources(&self) -> &[Arc<Dice>] {
        &self.sources
    }

    /// Add one more source to the group.
    pub fn push(&mut self, source: Arc<Dice>) {
        self.sources.push(source);
    }

    /// Replace every source, keeping the old list if `sources` is empty.
    pub fn set_sources(&mut self, sources: Vec<Arc<Dice>>) -> Result<(), DiceError> {
        *self = Self::new(sources)?;
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn source_maps(&self) -> Result<Vec<FrequencyMap>, DiceError> {
        self.sources.iter().map(|s| s.frequencies()).collect()
    }

    #[cfg(feature = "parallel")]
    fn source_maps(&self) -> Result<Vec<FrequencyMap>, DiceError> {
        use rayon::prelude::*;
        self.sources.par_iter().map(|s| s.frequencies()).collect()
    }
}

impl DistributionSource for MixedGroup {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        let maps = self.source_maps()?;
        let tables: Vec<Vec<(&Composition, &BigUint)>> =
            maps.iter().map(|map| map.iter().collect()).collect();

        let mut result = FrequencyMap::new();
        if tables.iter().any(Vec::is_empty) {
            return Ok(result);
        }

        // Mixed-radix counter, digit 0 is least significant.
        let mut counter = vec![0usize; tables.len()];
        'product: loop {
            let mut outcome = Composition::new();
            let mut weight = BigUint::from(1u32);
            for (table, &digit) in tables.iter().zip(&counter) {
                let (composition, frequency) = table[digit];
                outcome.absorb(composition, 1);
                weight *= frequency;
            }
            result.add(outcome, weight);

            for (position, digit) in counter.iter_mut().enumerate() {
                *digit += 1;
                if *digit < tables[position].len() {
                    continue 'product;
                }
                *digit = 0;
            }
            break;
        }

        tracing::debug!(
            sources = self.sources.len(),
            entries = result.len(),
            "combined mixed group"
        );
        Ok(result)
    }
}
