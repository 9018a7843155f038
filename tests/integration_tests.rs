use exactdice::compress::Compressor;
use exactdice::explode::Exploder;
use exactdice::filter::{Dropper, Keeper};
use exactdice::group::{HomogeneousGroup, MixedGroup};
use exactdice::indeterministic::IndeterministicGroup;
use exactdice::leaf::{Die, FudgeDie, RangeDie, UnfairDie};
use exactdice::registry::Combinator;
use exactdice::*;
use std::sync::Arc;

fn d(sides: i64) -> Arc<Dice> {
    Dice::from(Die::new(sides).unwrap()).shared()
}

fn big(n: u64) -> BigUint {
    BigUint::from(n)
}

/// The classic 2d6 distribution, rebuilt from compositions.
#[test]
fn test_two_d6_distribution() {
    let map = HomogeneousGroup::new(d(6), 2).unwrap().frequencies().unwrap();
    assert_eq!(map.len(), 21);
    assert_eq!(map.total(), big(36));

    let sums = map.sum_distribution().unwrap();
    let expected = [1u64, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1];
    for (offset, frequency) in expected.iter().enumerate() {
        assert_eq!(sums[&(offset as i64 + 2)], big(*frequency));
    }
}

/// Keep-highest-of-2 on d6 is triangular.
#[test]
fn test_drop_lowest_of_two_d6() {
    let pool = Dice::from(HomogeneousGroup::new(d(6), 2).unwrap()).shared();
    let map = Compressor::sum(Dice::from(Dropper::lowest(pool, 1)).shared())
        .frequencies()
        .unwrap();
    for face in 1..=6u64 {
        assert_eq!(map.get(&Composition::single(face as i64)), Some(&big(2 * face - 1)));
    }
    assert_eq!(map.total(), big(36));
}

/// A group, a mixed group of the same die and a fixed indeterminate count agree.
#[test]
fn test_equivalent_group_paths() {
    let d8 = d(8);
    let group = HomogeneousGroup::new(d8.clone(), 3).unwrap().frequencies().unwrap();
    let mixed = MixedGroup::new(vec![d8.clone(); 3]).unwrap().frequencies().unwrap();
    let always_three = Dice::from(UnfairDie::from_weights([(3, 1u32)]).unwrap()).shared();
    let indeterminate = IndeterministicGroup::new(d8, always_three)
        .frequencies()
        .unwrap();

    assert_eq!(group, mixed);
    assert_eq!(group, indeterminate);
}

#[test]
fn test_keep_equals_drop_for_five_dice() {
    let pool = Dice::from(HomogeneousGroup::new(d(6), 5).unwrap()).shared();
    for keep in 1..5 {
        let kept = Keeper::highest(pool.clone(), keep).unwrap().frequencies().unwrap();
        let dropped = Dropper::lowest(pool.clone(), 5 - keep).frequencies().unwrap();
        assert_eq!(kept, dropped);
    }
}

#[test]
fn test_fudge_die_shape() {
    let map = Dice::from(FudgeDie).frequencies().unwrap();
    assert_eq!(map.len(), 3);
    for (outcome, frequency) in &map {
        assert_eq!(outcome.dice_count(), 1);
        assert!([-1, 0, 1].contains(&outcome.sum().unwrap()));
        assert_eq!(frequency, &big(1));
    }
}

/// Exploding on every face is the same as always rolling `depth` dice.
#[test]
fn test_always_exploding_is_group() {
    let range = Dice::from(RangeDie::new(2, 10, 4).unwrap()).shared();
    let exploded = Exploder::when(range.clone(), |_| true, 3).frequencies().unwrap();
    let grouped = HomogeneousGroup::new(range, 3).unwrap().frequencies().unwrap();
    assert_eq!(exploded, grouped);
}

#[test]
fn test_exploding_d6_totals() {
    let map = Compressor::sum(Dice::from(Exploder::on_max(d(6), 3).unwrap()).shared())
        .frequencies()
        .unwrap();
    assert_eq!(map.total(), big(216));
    // 6 then 6 then 6 is the only way to reach 18.
    assert_eq!(map.get(&Composition::single(18)), Some(&big(1)));
    // 6 then 1 (then one unused roll).
    assert_eq!(map.get(&Composition::single(7)), Some(&big(6)));
    // Sum 6 means the chain went on, so a bare 6 never appears.
    assert_eq!(map.get(&Composition::single(6)), None);
}

/// Roll 1d4, then that many d6, and sum.
#[test]
fn test_indeterminate_pool_sum() {
    let count = Dice::from(Compressor::sum(d(4))).shared();
    let pool = Dice::from(IndeterministicGroup::new(d(6), count)).shared();
    let sums = Compressor::sum(pool).frequencies().unwrap();

    let expected_total = big(6 + 36 + 216 + 1296);
    assert_eq!(sums.total(), expected_total);
    assert_eq!(sums.get(&Composition::single(1)), Some(&big(1)));
    assert_eq!(sums.get(&Composition::single(24)), Some(&big(1)));
}

#[test]
fn test_overfilter_aborts_whole_computation() {
    let count = Dice::from(UnfairDie::from_weights([(1, 1u32), (3, 1)]).unwrap()).shared();
    let pool = Dice::from(IndeterministicGroup::new(d(6), count)).shared();
    let result = Keeper::highest(pool, 2).unwrap().frequencies();
    assert_eq!(
        result,
        Err(DiceError::Overfilter {
            requested: 2,
            available: 1
        })
    );
}

#[test]
fn test_registry_pipeline_and_json_export() {
    let mut registry = DiceRegistry::new();
    registry.define("d20", Die::new(20).unwrap());
    registry
        .compose("2d20", Combinator::Group { count: 2 }, vec!["d20".into()])
        .unwrap();
    registry
        .compose(
            "advantage",
            Combinator::Keep {
                lowest: 0,
                highest: 1,
            },
            vec!["2d20".into()],
        )
        .unwrap();

    let advantage = registry.frequencies(&"advantage".into()).unwrap();
    assert_eq!(advantage.get(&Composition::single(20)), Some(&big(39)));

    let json = advantage.to_json().unwrap();
    assert_eq!(FrequencyMap::from_json(&json).unwrap(), advantage);
}

#[test]
fn test_large_pool_stays_exact() {
    // 4^40 = 2^80, well past u64.
    let map = HomogeneousGroup::new(d(4), 40).unwrap().frequencies().unwrap();
    let expected: BigUint = "1208925819614629174706176".parse().unwrap();
    assert_eq!(map.total(), expected);
}

#[test]
fn test_face_overflow_is_reported() {
    let top = Dice::from(Die::with_range(i64::MAX - 1, i64::MAX).unwrap()).shared();
    let pair = Dice::from(HomogeneousGroup::new(top, 2).unwrap()).shared();
    assert!(matches!(
        Compressor::sum(pair.clone()).frequencies(),
        Err(DiceError::Overflow(_))
    ));

    // The count of an indeterminate pool is summed too.
    let pool = IndeterministicGroup::new(d(6), pair);
    assert!(matches!(pool.frequencies(), Err(DiceError::Overflow(_))));

    assert!(Die::with_range(i64::MIN, i64::MAX).is_err());
    assert!(RangeDie::new(i64::MIN, i64::MAX, 1).is_err());
}
