//! Distribution sources module.
//!
//! Every dice expression, from a single die to a deeply nested
//! composite, is a distribution source: it can produce a
//! [`FrequencyMap`]. The closed [`Dice`] enum lists every kind of source
//! the crate knows how to evaluate.

use crate::compress::Compressor;
use crate::error::DiceError;
use crate::explode::Exploder;
use crate::filter::{Dropper, Keeper};
use crate::frequency::FrequencyMap;
use crate::group::{HomogeneousGroup, MixedGroup};
use crate::indeterministic::IndeterministicGroup;
use crate::leaf::{Die, FudgeDie, RangeDie, UnfairDie};
use std::sync::Arc;

/// Predicate over a single face value, e.g. "explodes on 6".
pub type FacePredicate = Arc<dyn Fn(i64) -> bool + Send + Sync>;

/// Trait for anything that can produce an exact frequency map.
///
/// Sources are immutable descriptions of a random process; the map is
/// computed fresh on every call and the same source always produces the
/// same map.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, DistributionSource};
/// use exactdice::leaf::Die;
///
/// let d6 = Die::new(6).unwrap();
/// let map = d6.frequencies().unwrap();
/// assert_eq!(map.len(), 6);
/// assert_eq!(map.total(), BigUint::from(6u32));
/// assert_eq!(d6.distinct_values(), Some(6));
/// ```
pub trait DistributionSource: Send + Sync {
    /// Compute the frequency of every reachable composition.
    fn frequencies(&self) -> Result<FrequencyMap, DiceError>;

    /// Number of distinct values a single roll can produce.
    ///
    /// Leaf dice report this; composites return `None`.
    fn distinct_values(&self) -> Option<usize> {
        None
    }
}

/// Any dice expression.
///
/// Composites hold their inputs as `Arc<Dice>`, so one die can feed
/// several composites. Aliasing a source means independent rolls of an
/// identical die, never a shared single roll.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Dice, DistributionSource};
/// use exactdice::group::HomogeneousGroup;
/// use exactdice::leaf::Die;
/// use std::sync::Arc;
///
/// let d6 = Arc::new(Dice::from(Die::new(6).unwrap()));
/// let two_d6 = Dice::from(HomogeneousGroup::new(d6, 2).unwrap());
///
/// let map = two_d6.frequencies().unwrap();
/// assert_eq!(map.len(), 21);
/// assert_eq!(map.total(), BigUint::from(36u32));
/// ```
#[derive(Debug, Clone)]
pub enum Dice {
    Die(Die),
    Fudge(FudgeDie),
    Unfair(UnfairDie),
    Range(RangeDie),
    Group(HomogeneousGroup),
    Mixed(MixedGroup),
    Drop(Dropper),
    Keep(Keeper),
    Explode(Exploder),
    Compress(Compressor),
    Indeterministic(IndeterministicGroup),
}

impl Dice {
    /// Whether this is a single die rather than a composite.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Dice::Die(_) | Dice::Fudge(_) | Dice::Unfair(_) | Dice::Range(_)
        )
    }

    /// Largest face a leaf die can show.
    ///
    /// This is the conventional face a leaf explodes on. Composites have
    /// no single maximum face and return `None`.
    pub fn max_face(&self) -> Option<i64> {
        match self {
            Dice::Die(die) => Some(die.max()),
            Dice::Fudge(_) => Some(FudgeDie::MAX),
            Dice::Unfair(die) => Some(die.max()),
            Dice::Range(die) => Some(die.max()),
            _ => None,
        }
    }

    /// The sources this expression reads from, in order.
    pub fn inputs(&self) -> Vec<&Arc<Dice>> {
        match self {
            Dice::Die(_) | Dice::Fudge(_) | Dice::Unfair(_) | Dice::Range(_) => Vec::new(),
            Dice::Group(group) => vec![group.source()],
            Dice::Mixed(mixed) => mixed.sources().iter().collect(),
            Dice::Drop(dropper) => vec![dropper.source()],
            Dice::Keep(keeper) => vec![keeper.source()],
            Dice::Explode(exploder) => vec![exploder.source()],
            Dice::Compress(compressor) => vec![compressor.source()],
            Dice::Indeterministic(group) => vec![group.source(), group.count()],
        }
    }

    /// Wrap in an `Arc` for use as a composite input.
    pub fn shared(self) -> Arc<Dice> {
        Arc::new(self)
    }
}

impl DistributionSource for Dice {
    fn frequencies(&self) -> Result<FrequencyMap, DiceError> {
        match self {
            Dice::Die(die) => die.frequencies(),
            Dice::Fudge(die) => die.frequencies(),
            Dice::Unfair(die) => die.frequencies(),
            Dice::Range(die) => die.frequencies(),
            Dice::Group(group) => group.frequencies(),
            Dice::Mixed(mixed) => mixed.frequencies(),
            Dice::Drop(dropper) => dropper.frequencies(),
            Dice::Keep(keeper) => keeper.frequencies(),
            Dice::Explode(exploder) => exploder.frequencies(),
            Dice::Compress(compressor) => compressor.frequencies(),
            Dice::Indeterministic(group) => group.frequencies(),
        }
    }

    fn distinct_values(&self) -> Option<usize> {
        match self {
            Dice::Die(die) => die.distinct_values(),
            Dice::Fudge(die) => die.distinct_values(),
            Dice::Unfair(die) => die.distinct_values(),
            Dice::Range(die) => die.distinct_values(),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_dice {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Dice {
                fn from(value: $ty) -> Self {
                    Dice::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_dice!(
    Die(Die),
    Fudge(FudgeDie),
    Unfair(UnfairDie),
    Range(RangeDie),
    Group(HomogeneousGroup),
    Mixed(MixedGroup),
    Drop(Dropper),
    Keep(Keeper),
    Explode(Exploder),
    Compress(Compressor),
    Indeterministic(IndeterministicGroup),
);
