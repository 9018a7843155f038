//! Named dice expression registry.
//!
//! Provides the `DiceRegistry` type, which holds dice expressions under
//! names, lets composites be rewired after creation, and caches computed
//! frequency maps until something they depend on changes.

use crate::compress::{Compression, Compressor};
use crate::dice_id::DiceId;
use crate::error::DiceError;
use crate::explode::Exploder;
use crate::filter::{Dropper, Keeper};
use crate::frequency::FrequencyMap;
use crate::graph::DependencyGraph;
use crate::group::{HomogeneousGroup, MixedGroup};
use crate::indeterministic::IndeterministicGroup;
use crate::source::{Dice, DistributionSource, FacePredicate};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How a named composite combines its inputs.
#[derive(Clone)]
pub enum Combinator {
    /// `count` copies of the single input.
    Group { count: u32 },
    /// One roll of each input.
    Mixed,
    Drop { lowest: u64, highest: u64 },
    Keep { lowest: u64, highest: u64 },
    /// Explode on `predicate`, or on the input's largest face if `None`.
    Explode {
        predicate: Option<FacePredicate>,
        depth: u8,
    },
    Compress(Compression),
    /// First input is the die, second the count distribution.
    Indeterministic,
}

impl Combinator {
    fn name(&self) -> &'static str {
        match self {
            Combinator::Group { .. } => "group",
            Combinator::Mixed => "mixed group",
            Combinator::Drop { .. } => "dropper",
            Combinator::Keep { .. } => "keeper",
            Combinator::Explode { .. } => "exploder",
            Combinator::Compress(_) => "compressor",
            Combinator::Indeterministic => "indeterministic group",
        }
    }

    /// Check the input count and numeric settings without building.
    pub fn validate(&self, inputs: usize) -> Result<(), DiceError> {
        let arity_ok = match self {
            Combinator::Mixed => inputs >= 1,
            Combinator::Indeterministic => inputs == 2,
            _ => inputs == 1,
        };
        if !arity_ok {
            return Err(DiceError::invalid(
                self.name(),
                format!("cannot take {inputs} inputs"),
            ));
        }
        match self {
            Combinator::Group { count: 0 } => {
                Err(DiceError::invalid("group", "count must be at least 1"))
            }
            Combinator::Keep {
                lowest: 0,
                highest: 0,
            } => Err(DiceError::invalid("keeper", "nothing to keep")),
            _ => Ok(()),
        }
    }

    /// Build the composite over already-built inputs.
    pub fn build(&self, inputs: &[Arc<Dice>]) -> Result<Dice, DiceError> {
        self.validate(inputs.len())?;
        let first = || inputs[0].clone();
        Ok(match self {
            Combinator::Group { count } => HomogeneousGroup::new(first(), *count)?.into(),
            Combinator::Mixed => MixedGroup::new(inputs.to_vec())?.into(),
            Combinator::Drop { lowest, highest } => {
                Dropper::new(first(), *lowest, *highest).into()
            }
            Combinator::Keep { lowest, highest } => {
                Keeper::new(first(), *lowest, *highest)?.into()
            }
            Combinator::Explode {
                predicate: Some(predicate),
                depth,
            } => Exploder::new(first(), predicate.clone(), *depth).into(),
            Combinator::Explode {
                predicate: None,
                depth,
            } => Exploder::on_max(first(), *depth)?.into(),
            Combinator::Compress(compression) => {
                Compressor::new(first(), compression.clone()).into()
            }
            Combinator::Indeterministic => {
                IndeterministicGroup::new(first(), inputs[1].clone()).into()
            }
        })
    }
}

impl fmt::Debug for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::Group { count } => f.debug_struct("Group").field("count", count).finish(),
            Combinator::Drop { lowest, highest } => f
                .debug_struct("Drop")
                .field("lowest", lowest)
                .field("highest", highest)
                .finish(),
            Combinator::Keep { lowest, highest } => f
                .debug_struct("Keep")
                .field("lowest", lowest)
                .field("highest", highest)
                .finish(),
            Combinator::Explode { predicate, depth } => f
                .debug_struct("Explode")
                .field("predicate", &predicate.as_ref().map(|_| "<fn>"))
                .field("depth", depth)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone)]
enum Definition {
    Fixed(Arc<Dice>),
    Composite {
        combinator: Combinator,
        inputs: Vec<DiceId>,
    },
}

/// Named dice expressions with cycle-checked wiring and cached results.
///
/// Composites refer to their inputs by name. Every change that would make
/// an expression depend on itself is rejected before anything is
/// modified, and changing an expression drops the cached maps of
/// everything built on it.
///
/// # Examples
///
/// ```rust
/// use exactdice::{BigUint, Composition, DiceError, DiceRegistry};
/// use exactdice::leaf::Die;
/// use exactdice::registry::Combinator;
///
/// let mut registry = DiceRegistry::new();
/// registry.define("d6", Die::new(6).unwrap());
/// registry.compose("2d6", Combinator::Group { count: 2 }, vec!["d6".into()]).unwrap();
/// registry.compose("best", Combinator::Keep { lowest: 0, highest: 1 }, vec!["2d6".into()]).unwrap();
///
/// let best = registry.frequencies(&"best".into()).unwrap();
/// assert_eq!(best.get(&Composition::single(6)), Some(&BigUint::from(11u32)));
///
/// // "2d6" cannot be rewired to read from "best", which reads "2d6".
/// let err = registry.compose("2d6", Combinator::Group { count: 2 }, vec!["best".into()]);
/// assert!(matches!(err, Err(DiceError::Cycle { .. })));
/// ```
#[derive(Debug, Default)]
pub struct DiceRegistry {
    definitions: HashMap<DiceId, Definition>,
    graph: DependencyGraph,
    cache: HashMap<DiceId, FrequencyMap>,
}

impl DiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a self-contained expression (usually a leaf die) under `id`.
    ///
    /// Replaces any previous definition and drops the inputs it had.
    pub fn define(&mut self, id: impl Into<DiceId>, dice: impl Into<Dice>) {
        let id = id.into();
        self.graph.add_node(id.clone());
        self.graph.clear_dependencies(&id);
        self.definitions
            .insert(id.clone(), Definition::Fixed(Arc::new(dice.into())));
        self.invalidate(&id);
        tracing::debug!(id = %id, "defined dice expression");
    }

    /// Register a composite reading the named `inputs`.
    ///
    /// # Errors
    ///
    /// * `DiceError::InvalidConfiguration` if `combinator` rejects the input
    ///   count or its settings
    /// * `DiceError::UnknownDice` if an input has not been defined
    /// * `DiceError::Cycle` if `id` would end up reading itself
    ///
    /// On error the registry is unchanged.
    pub fn compose(
        &mut self,
        id: impl Into<DiceId>,
        combinator: Combinator,
        inputs: Vec<DiceId>,
    ) -> Result<(), DiceError> {
        let id = id.into();
        combinator.validate(inputs.len())?;
        for input in &inputs {
            self.check_input(&id, input)?;
        }
        self.check_explosion_face(&combinator, &inputs)?;

        self.graph.add_node(id.clone());
        self.graph.clear_dependencies(&id);
        for input in &inputs {
            self.graph.add_edge(id.clone(), input.clone());
        }
        tracing::debug!(id = %id, combinator = ?combinator, inputs = inputs.len(), "composed dice expression");
        self.definitions
            .insert(id.clone(), Definition::Composite { combinator, inputs });
        self.invalidate(&id);
        Ok(())
    }

    /// Append one more input to an existing composite.
    ///
    /// Useful for growing a [`Combinator::Mixed`] group. Fails, leaving the
    /// registry unchanged, for unknown names, fixed expressions, input
    /// counts the combinator does not accept, and cycles.
    pub fn attach(&mut self, id: &DiceId, input: impl Into<DiceId>) -> Result<(), DiceError> {
        let input = input.into();
        let Some(definition) = self.definitions.get(id) else {
            return Err(DiceError::UnknownDice(id.clone()));
        };
        let Definition::Composite { combinator, inputs } = definition else {
            return Err(DiceError::invalid(
                "registry",
                format!("{id} is not a composite"),
            ));
        };
        combinator.validate(inputs.len() + 1)?;
        self.check_input(id, &input)?;

        self.graph.add_edge(id.clone(), input.clone());
        if let Some(Definition::Composite { inputs, .. }) = self.definitions.get_mut(id) {
            inputs.push(input);
        }
        self.invalidate(id);
        Ok(())
    }

    /// Swap the combinator of an existing composite, keeping its inputs.
    pub fn set_combinator(&mut self, id: &DiceId, combinator: Combinator) -> Result<(), DiceError> {
        let inputs = match self.definitions.get(id) {
            Some(Definition::Composite { inputs, .. }) => inputs.clone(),
            Some(Definition::Fixed(_)) => {
                return Err(DiceError::invalid(
                    "registry",
                    format!("{id} is not a composite"),
                ))
            }
            None => return Err(DiceError::UnknownDice(id.clone())),
        };
        combinator.validate(inputs.len())?;
        self.check_explosion_face(&combinator, &inputs)?;

        if let Some(Definition::Composite {
            combinator: current,
            ..
        }) = self.definitions.get_mut(id)
        {
            *current = combinator;
        }
        self.invalidate(id);
        Ok(())
    }

    /// An explosion without a predicate needs an input with a largest face.
    fn check_explosion_face(
        &self,
        combinator: &Combinator,
        inputs: &[DiceId],
    ) -> Result<(), DiceError> {
        let (Combinator::Explode { predicate: None, .. }, [input]) = (combinator, inputs) else {
            return Ok(());
        };
        if self.build(input)?.max_face().is_none() {
            tracing::warn!(input = %input, "rejected explosion without a default face");
            return Err(DiceError::invalid(
                "exploder",
                format!("{input} has no default explosion face"),
            ));
        }
        Ok(())
    }

    fn check_input(&self, id: &DiceId, input: &DiceId) -> Result<(), DiceError> {
        if input != id && !self.definitions.contains_key(input) {
            tracing::warn!(id = %id, input = %input, "rejected unknown input");
            return Err(DiceError::UnknownDice(input.clone()));
        }
        if let Err(err) = self.graph.check_edge(id, input) {
            tracing::warn!(id = %id, input = %input, error = %err, "rejected cyclic input");
            return Err(err);
        }
        Ok(())
    }

    pub fn contains(&self, id: &DiceId) -> bool {
        self.definitions.contains_key(id)
    }

    /// Names `id` reads directly.
    pub fn inputs(&self, id: &DiceId) -> Vec<DiceId> {
        self.graph.dependencies(id)
    }

    /// Build the expression tree for `id`.
    ///
    /// A name used by several composites becomes one shared `Arc`.
    pub fn build(&self, id: &DiceId) -> Result<Arc<Dice>, DiceError> {
        self.build_with(id, &mut HashMap::new())
    }

    fn build_with(
        &self,
        id: &DiceId,
        built: &mut HashMap<DiceId, Arc<Dice>>,
    ) -> Result<Arc<Dice>, DiceError> {
        if let Some(dice) = built.get(id) {
            return Ok(dice.clone());
        }
        let dice = match self.definitions.get(id) {
            Some(Definition::Fixed(dice)) => dice.clone(),
            Some(Definition::Composite { combinator, inputs }) => {
                let children = inputs
                    .iter()
                    .map(|input| self.build_with(input, built))
                    .collect::<Result<Vec<_>, _>>()?;
                Arc::new(combinator.build(&children)?)
            }
            None => return Err(DiceError::UnknownDice(id.clone())),
        };
        built.insert(id.clone(), dice.clone());
        Ok(dice)
    }

    /// The frequency map of `id`, computed once and cached.
    pub fn frequencies(&mut self, id: &DiceId) -> Result<FrequencyMap, DiceError> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(cached.clone());
        }
        let map = self.build(id)?.frequencies()?;
        self.cache.insert(id.clone(), map.clone());
        Ok(map)
    }

    /// Frequency maps of every registered expression.
    pub fn resolve_all(&mut self) -> Result<HashMap<DiceId, FrequencyMap>, DiceError> {
        for id in self.graph.topological_sort()? {
            if self.definitions.contains_key(&id) {
                self.frequencies(&id)?;
            }
        }
        Ok(self.cache.clone())
    }

    /// Drop the cached map of `id` and of everything built on it.
    pub fn invalidate(&mut self, id: &DiceId) {
        self.cache.remove(id);
        for dependent in self.graph.dependents(id) {
            self.cache.remove(&dependent);
        }
    }

    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Whether `id` currently has a cached map.
    pub fn is_cached(&self, id: &DiceId) -> bool {
        self.cache.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composition;
    use crate::leaf::{Die, FudgeDie};
    use num_bigint::BigUint;

    fn id(name: &str) -> DiceId {
        DiceId::new(name)
    }

    fn registry_with_dice() -> DiceRegistry {
        let mut registry = DiceRegistry::new();
        registry.define("d4", Die::new(4).unwrap());
        registry.define("d6", Die::new(6).unwrap());
        registry
    }

    #[test]
    fn test_compose_and_resolve() {
        let mut registry = registry_with_dice();
        registry
            .compose("3d6", Combinator::Group { count: 3 }, vec![id("d6")])
            .unwrap();
        registry
            .compose("total", Combinator::Compress(Compression::sum()), vec![id("3d6")])
            .unwrap();

        let total = registry.frequencies(&id("total")).unwrap();
        assert_eq!(total.total(), BigUint::from(216u32));
        assert_eq!(total.get(&Composition::single(3)), Some(&BigUint::from(1u32)));
        assert!(registry.is_cached(&id("total")));
    }

    #[test]
    fn test_unknown_input_is_rejected() {
        let mut registry = registry_with_dice();
        let result = registry.compose("pool", Combinator::Group { count: 2 }, vec![id("d20")]);
        assert_eq!(result, Err(DiceError::UnknownDice(id("d20"))));
        assert!(!registry.contains(&id("pool")));
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let mut registry = registry_with_dice();
        let result = registry.compose("loop", Combinator::Mixed, vec![id("d6"), id("loop")]);
        assert!(matches!(result, Err(DiceError::Cycle { .. })));
        assert!(!registry.contains(&id("loop")));
    }

    #[test]
    fn test_cycle_rejection_keeps_previous_wiring() {
        let mut registry = registry_with_dice();
        registry
            .compose("a", Combinator::Group { count: 2 }, vec![id("d6")])
            .unwrap();
        registry
            .compose("b", Combinator::Keep { lowest: 0, highest: 1 }, vec![id("a")])
            .unwrap();

        let result = registry.compose("a", Combinator::Group { count: 2 }, vec![id("b")]);
        assert_eq!(
            result,
            Err(DiceError::Cycle {
                path: vec![id("a"), id("b"), id("a")]
            })
        );
        assert_eq!(registry.inputs(&id("a")), vec![id("d6")]);
        assert_eq!(
            registry.frequencies(&id("b")).unwrap().total(),
            BigUint::from(36u32)
        );
    }

    #[test]
    fn test_attach_grows_mixed_group() {
        let mut registry = registry_with_dice();
        registry.compose("mixed", Combinator::Mixed, vec![id("d4")]).unwrap();
        assert_eq!(
            registry.frequencies(&id("mixed")).unwrap().total(),
            BigUint::from(4u32)
        );

        registry.attach(&id("mixed"), "d6").unwrap();
        assert!(!registry.is_cached(&id("mixed")));
        assert_eq!(
            registry.frequencies(&id("mixed")).unwrap().total(),
            BigUint::from(24u32)
        );

        assert!(matches!(
            registry.attach(&id("mixed"), "mixed"),
            Err(DiceError::Cycle { .. })
        ));
        assert!(matches!(
            registry.attach(&id("d4"), "d6"),
            Err(DiceError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_attach_respects_arity() {
        let mut registry = registry_with_dice();
        registry
            .compose("pool", Combinator::Group { count: 2 }, vec![id("d6")])
            .unwrap();
        assert!(registry.attach(&id("pool"), "d4").is_err());
        assert_eq!(registry.inputs(&id("pool")), vec![id("d6")]);
    }

    #[test]
    fn test_redefining_input_invalidates_dependents() {
        let mut registry = registry_with_dice();
        registry
            .compose("pool", Combinator::Group { count: 2 }, vec![id("d6")])
            .unwrap();
        registry
            .compose("best", Combinator::Drop { lowest: 1, highest: 0 }, vec![id("pool")])
            .unwrap();
        registry.frequencies(&id("best")).unwrap();
        assert!(registry.is_cached(&id("best")));

        registry.define("d6", FudgeDie);
        assert!(!registry.is_cached(&id("best")));
        assert_eq!(
            registry.frequencies(&id("best")).unwrap().total(),
            BigUint::from(9u32)
        );
    }

    #[test]
    fn test_set_combinator_validates() {
        let mut registry = registry_with_dice();
        registry
            .compose("pool", Combinator::Group { count: 2 }, vec![id("d6")])
            .unwrap();
        assert!(registry
            .set_combinator(&id("pool"), Combinator::Group { count: 0 })
            .is_err());
        assert_eq!(registry.frequencies(&id("pool")).unwrap().len(), 21);

        registry
            .set_combinator(&id("pool"), Combinator::Group { count: 3 })
            .unwrap();
        assert_eq!(registry.frequencies(&id("pool")).unwrap().len(), 56);
    }

    #[test]
    fn test_shared_inputs_build_once() {
        let mut registry = registry_with_dice();
        registry
            .compose("pair", Combinator::Mixed, vec![id("d6"), id("d6")])
            .unwrap();
        let pair = registry.build(&id("pair")).unwrap();
        let inputs = pair.inputs();
        assert!(Arc::ptr_eq(inputs[0], inputs[1]));
        assert_eq!(pair.frequencies().unwrap().total(), BigUint::from(36u32));
    }

    #[test]
    fn test_explode_defaults_to_max_face() {
        let mut registry = registry_with_dice();
        registry
            .compose(
                "boom",
                Combinator::Explode {
                    predicate: None,
                    depth: 2,
                },
                vec![id("d6")],
            )
            .unwrap();
        let map = registry.frequencies(&id("boom")).unwrap();
        assert_eq!(map.get(&Composition::from_faces([6, 6])), Some(&BigUint::from(1u32)));
    }

    #[test]
    fn test_explode_without_face_rejected_at_compose() {
        let mut registry = registry_with_dice();
        registry
            .compose("2d6", Combinator::Group { count: 2 }, vec![id("d6")])
            .unwrap();
        let default_face = Combinator::Explode {
            predicate: None,
            depth: 2,
        };

        let result = registry.compose("boom", default_face.clone(), vec![id("2d6")]);
        assert!(matches!(result, Err(DiceError::InvalidConfiguration { .. })));
        assert!(!registry.contains(&id("boom")));

        let sixes: FacePredicate = Arc::new(|face| face == 6);
        registry
            .compose(
                "boom",
                Combinator::Explode {
                    predicate: Some(sixes),
                    depth: 2,
                },
                vec![id("2d6")],
            )
            .unwrap();
        assert!(registry.set_combinator(&id("boom"), default_face).is_err());
        assert_eq!(
            registry.frequencies(&id("boom")).unwrap().total(),
            BigUint::from(1296u32)
        );
    }

    #[test]
    fn test_invalidate_all_clears_cache() {
        let mut registry = registry_with_dice();
        registry
            .compose("pair", Combinator::Mixed, vec![id("d4"), id("d6")])
            .unwrap();
        registry.resolve_all().unwrap();
        assert!(registry.is_cached(&id("pair")));
        assert!(registry.is_cached(&id("d4")));

        registry.invalidate_all();
        assert!(!registry.is_cached(&id("pair")));
        assert!(!registry.is_cached(&id("d4")));
        assert_eq!(
            registry.frequencies(&id("pair")).unwrap().total(),
            BigUint::from(24u32)
        );
    }

    #[test]
    fn test_resolve_all() {
        let mut registry = registry_with_dice();
        registry
            .compose(
                "count",
                Combinator::Indeterministic,
                vec![id("d6"), id("d4")],
            )
            .unwrap();
        let all = registry.resolve_all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[&id("d4")].total(), BigUint::from(4u32));
    }
}
