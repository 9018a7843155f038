//! # exactdice - Exact Dice Distributions
//!
//! Computes the exact frequency distribution of dice expressions using
//! arbitrary-precision integers:
//! - **Exact**: every result is a count of dice-roll sequences, never a float
//! - **Composable**: groups, filters, explosions and folds nest arbitrarily
//! - **Deterministic**: the same expression always yields the same map
//!
//! ## Core Concepts
//!
//! ### Compositions and frequency maps
//!
//! A [`Composition`] is the multiset of faces shown by one joint roll. A
//! [`FrequencyMap`] maps each reachable composition to the number of
//! ordered roll sequences producing it.
//!
//! ```text
//! [leaf die] → [group / mixed] → [drop / keep / explode] → [compress] → FrequencyMap
//! ```
//!
//! ### Sources
//!
//! Everything implementing [`DistributionSource`] can produce a frequency
//! map. The [`Dice`] enum covers leaf dice and every composite, and
//! composites take `Arc<Dice>` inputs so one die may feed many of them.
//!
//! ### Registry
//!
//! [`DiceRegistry`] stores expressions by name, refuses wiring that would
//! make an expression depend on itself, and caches computed maps.
//!
//! ## Example
//!
//! ```rust
//! use exactdice::*;
//! use exactdice::compress::Compressor;
//! use exactdice::filter::Keeper;
//! use exactdice::group::HomogeneousGroup;
//! use exactdice::leaf::Die;
//!
//! // 4d6, keep the highest 3, summed.
//! let d6 = Dice::from(Die::new(6).unwrap()).shared();
//! let four_d6 = Dice::from(HomogeneousGroup::new(d6, 4).unwrap()).shared();
//! let best_three = Dice::from(Keeper::highest(four_d6, 3).unwrap()).shared();
//! let score = Compressor::sum(best_three).frequencies().unwrap();
//!
//! assert_eq!(score.total(), BigUint::from(1296u32));
//! assert_eq!(score.get(&Composition::single(18)), Some(&BigUint::from(21u32)));
//! ```
//!
//! ## Modules
//!
//! - [`composition`] - Outcome multisets
//! - [`frequency`] - Frequency maps
//! - [`math`] - Factorials, binomials, multinomials
//! - [`source`] - The source trait and the `Dice` enum
//! - [`leaf`] - Single dice
//! - [`group`] - Homogeneous and mixed groups
//! - [`filter`] - Drop and keep
//! - [`explode`] - Exploding dice
//! - [`compress`] - Folding rolls to a scalar
//! - [`indeterministic`] - Random die counts
//! - [`registry`] - Named expressions
//! - [`graph`] - Dependency graph management
//! - [`error`] - Error types

pub mod composition;
pub mod compress;
pub mod dice_id;
pub mod error;
pub mod explode;
pub mod filter;
pub mod frequency;
pub mod graph;
pub mod group;
pub mod indeterministic;
pub mod leaf;
pub mod math;
pub mod registry;
pub mod source;

// Re-export main types for convenience
pub use composition::Composition;
pub use dice_id::DiceId;
pub use error::DiceError;
pub use frequency::FrequencyMap;
pub use registry::DiceRegistry;
pub use source::{Dice, DistributionSource, FacePredicate};

// Frequencies are reported as big integers
pub use num_bigint::BigUint;
