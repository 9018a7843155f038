//! Exploding dice.
//!
//! A die explodes when it shows a qualifying face: another die of the
//! same kind is rolled and added to the roll. Explosion chains are cut
//! off after a fixed number of rolls since an unbounded chain has no
//! finite frequency map.

use crate::composition::Composition;
use crate::error::DiceError;
use crate::frequency::FrequencyMap;
use crate::group;
use crate::source::{Dice, DistributionSource, FacePredicate};
use std::fmt;
use std::sync::Arc;

/// Re-rolls and accumulates while the predicate holds, up to `depth` rolls.
///
/// Every result is weighted over the full `depth` rolls, so the map's
/// total is `D^depth` for a fair die with `D` faces. A chain that stops
/// early counts once for every way the unused rolls could have landed.
///
/// `depth` 0 yields an empty map.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Composition, Dice, DistributionSource};
/// use exactdice::explode::Exploder;
/// use exactdice::leaf::Die;
///
/// let d6 = Dice::from(Die::new(6).unwrap()).shared();
/// let exploding = Exploder::on_max(d6, 2).unwrap();
/// let map = exploding.frequencies().unwrap();
///
/// assert_eq!(map.total(), BigUint::from(36u32));
/// assert_eq!(map.get(&Composition::single(3)), Some(&BigUint::from(6u32)));
/// assert_eq!(map.get(&Composition::from_faces([6, 3])), Some(&BigUint::from(1u32)));
/// ```
#[derive(Clone)]
pub struct Exploder {
    source: Arc<Dice>,
    predicate: FacePredicate,
    depth: u8,
}

impl Exploder {
    pub fn new(source: Arc<Dice>, predicate: FacePredicate, depth: u8) -> Self {
        Self {
            source,
            predicate,
            depth,
        }
    }

    /// Explode on a closure instead of a prebuilt [`FacePredicate`].
    pub fn when(
        source: Arc<Dice>,
        predicate: impl Fn(i64) -> bool + Send + Sync + 'static,
        depth: u8,
    ) -> Self {
        Self::new(source, Arc::new(predicate), depth)
    }

    /// Explode on the source's largest face.
    ///
    /// Fails for sources without a single largest face (composites).
    pub fn on_max(source: Arc<Dice>, depth: u8) -> Result<Self, DiceError> {
        let max = source.max_face().ok_or_else(|| {
            DiceError::invalid("exploder", "source has no default explosion face")
        })?;
        Ok(Self::when(source, move |face| face == max, depth))
    }

    pub fn source(&self) -> &Arc<Dice> {
        &self.source
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: u8) {
        self.depth = depth;
    }

    pub fn set_predicate(&mut self, predicate: FacePredicate) {
        self.predicate = predicate;
    }

    /// Whether `face` triggers another roll.
    pub fn explodes_on(&self, face: i64) -> bool {
        (self.predicate)(face)
    }

    fn all_explode(&self, outcome: &Composition) -> bool {
        outcome.faces().all(|face| self.explodes_on(face))
    }
}

impl DistributionSource for Exploder {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        if self.depth == 0 {
            return Ok(FrequencyMap::new());
        }
        let base = self.source.frequencies()?;

        if base.outcomes().all(|outcome| self.all_explode(outcome)) {
            tracing::debug!(depth = self.depth, "every face explodes, rolling as a group");
            return group::replicate(&base, u32::from(self.depth));
        }

        let branching = base.total();
        let mut accumulated = base.clone();
        for round in 2..=self.depth {
            let mut next = FrequencyMap::new();
            let mut expanded = 0usize;
            for (outcome, frequency) in accumulated {
                if self.all_explode(&outcome) {
                    expanded += 1;
                    for (roll, roll_frequency) in &base {
                        next.add(outcome.merge(roll), &frequency * roll_frequency);
                    }
                } else {
                    next.add(outcome, frequency * &branching);
                }
            }
            tracing::trace!(round, expanded, entries = next.len(), "explosion round");
            accumulated = next;
        }

        tracing::debug!(
            depth = self.depth,
            entries = accumulated.len(),
            "exploded dice"
        );
        Ok(accumulated)
    }
}

impl fmt::Debug for Exploder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exploder")
            .field("source", &self.source)
            .field("predicate", &"<fn>")
            .field("depth", &self.depth)
            .finish()
    }
}
