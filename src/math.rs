//! Exact combinatorial arithmetic.
//!
//! Factorials, binomial and multinomial coefficients over arbitrary
//! precision integers, plus a bounded random big integer used by the
//! sampling helpers. Arguments are signed so that invalid requests are
//! reported as [`DiceError::Domain`] instead of being unrepresentable.

use crate::error::DiceError;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;

/// `n!`.
///
/// # Errors
///
/// `DiceError::Domain` if `n` is negative.
///
/// # Examples
///
/// ```rust
/// use exactdice::math::factorial;
/// use exactdice::BigUint;
///
/// assert_eq!(factorial(0).unwrap(), BigUint::from(1u32));
/// assert_eq!(factorial(5).unwrap(), BigUint::from(120u32));
/// assert!(factorial(-1).is_err());
/// ```
pub fn factorial(n: i64) -> Result<BigUint, DiceError> {
    if n < 0 {
        return Err(DiceError::Domain(format!("factorial of negative number {n}")));
    }
    Ok((2..=n as u64).fold(BigUint::one(), |acc, k| acc * k))
}

/// `total` choose `group`.
///
/// Uses the multiplicative formula over the smaller of `group` and
/// `total - group`, dividing at every step so the running value stays a
/// binomial coefficient itself.
///
/// # Errors
///
/// `DiceError::Domain` if either argument is negative or `group > total`.
///
/// # Examples
///
/// ```rust
/// use exactdice::math::binomial;
/// use exactdice::BigUint;
///
/// assert_eq!(binomial(6, 2).unwrap(), BigUint::from(15u32));
/// assert_eq!(binomial(6, 0).unwrap(), BigUint::from(1u32));
/// assert!(binomial(2, 3).is_err());
/// ```
pub fn binomial(total: i64, group: i64) -> Result<BigUint, DiceError> {
    if total < 0 || group < 0 {
        return Err(DiceError::Domain(format!(
            "binomial({total}, {group}) has a negative argument"
        )));
    }
    if group > total {
        return Err(DiceError::Domain(format!(
            "binomial({total}, {group}) chooses more than the total"
        )));
    }
    let total = total as u64;
    let group = (group as u64).min(total - group as u64);
    let mut result = BigUint::one();
    for i in 1..=group {
        result *= total - group + i;
        result /= i;
    }
    Ok(result)
}

/// Ways to split `total` labeled items into ordered groups of exactly
/// the given sizes.
///
/// # Errors
///
/// `DiceError::Domain` if any group is negative or the groups do not sum
/// to `total`.
pub fn multinomial_complete(total: i64, groups: &[i64]) -> Result<BigUint, DiceError> {
    let assigned = group_sum(total, groups)?;
    if assigned != total {
        return Err(DiceError::Domain(format!(
            "multinomial groups sum to {assigned}, expected {total}"
        )));
    }
    binomial_product(total, groups)
}

/// Like [`multinomial_complete`] but the groups may leave items over.
///
/// The leftover items form one more group whose members stay
/// distinguishable, contributing a trailing `leftover!` factor. With no
/// groups at all this is `total!`.
///
/// # Errors
///
/// `DiceError::Domain` if any group is negative or the groups sum to more
/// than `total`.
///
/// # Examples
///
/// ```rust
/// use exactdice::math::{factorial, multinomial_incomplete};
///
/// assert_eq!(multinomial_incomplete(5, &[]).unwrap(), factorial(5).unwrap());
/// assert!(multinomial_incomplete(3, &[2, 2]).is_err());
/// ```
pub fn multinomial_incomplete(total: i64, groups: &[i64]) -> Result<BigUint, DiceError> {
    let assigned = group_sum(total, groups)?;
    if assigned > total {
        return Err(DiceError::Domain(format!(
            "multinomial groups sum to {assigned}, more than {total}"
        )));
    }
    Ok(binomial_product(total, groups)? * factorial(total - assigned)?)
}

fn group_sum(total: i64, groups: &[i64]) -> Result<i64, DiceError> {
    if total < 0 {
        return Err(DiceError::Domain(format!("multinomial of negative total {total}")));
    }
    if let Some(group) = groups.iter().find(|&&g| g < 0) {
        return Err(DiceError::Domain(format!("negative multinomial group {group}")));
    }
    groups
        .iter()
        .try_fold(0i64, |acc, &g| acc.checked_add(g))
        .ok_or_else(|| DiceError::Domain(String::from("multinomial groups overflow")))
}

fn binomial_product(total: i64, groups: &[i64]) -> Result<BigUint, DiceError> {
    let mut remaining = total;
    let mut result = BigUint::one();
    for &group in groups {
        result *= binomial(remaining, group)?;
        remaining -= group;
    }
    Ok(result)
}

/// A random integer in `[start, end]`, both ends inclusive.
///
/// Only the sampling helpers use this; exact enumeration never does.
/// The draw is uniform as far as the supplied generator is.
///
/// # Errors
///
/// `DiceError::Domain` if `start > end`.
pub fn random_in_range<R: Rng + ?Sized>(
    rng: &mut R,
    start: &BigInt,
    end: &BigInt,
) -> Result<BigInt, DiceError> {
    if start > end {
        return Err(DiceError::Domain(format!("empty range [{start}, {end}]")));
    }
    let upper = end + BigInt::one();
    Ok(rng.gen_bigint_range(start, &upper))
}
