//! Error types for dice distribution computation.
//!
//! All errors that can occur while configuring or evaluating dice
//! expressions are represented by the `DiceError` enum.

use crate::dice_id::DiceId;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[DiceId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors that can occur while building or evaluating dice expressions.
///
/// # Examples
///
/// ```rust
/// use exactdice::DiceError;
///
/// let err = DiceError::Overfilter { requested: 3, available: 2 };
/// assert_eq!(err.to_string(), "Cannot filter 3 dice from a roll of 2");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiceError {
    /// A component was given a configuration outside its valid domain.
    ///
    /// Raised by constructors and setters. A setter that returns this
    /// error leaves the component unchanged.
    #[error("Invalid {component} configuration: {reason}")]
    InvalidConfiguration {
        component: &'static str,
        reason: String,
    },

    /// A drop or keep asked for more dice than a composition holds.
    ///
    /// Raised during frequency computation; no partial map is returned.
    #[error("Cannot filter {requested} dice from a roll of {available}")]
    Overfilter { requested: u64, available: u64 },

    /// A combinatorial coefficient is undefined for the given arguments.
    #[error("Domain error: {0}")]
    Domain(String),

    /// Attaching an input would make an expression depend on itself.
    ///
    /// If A uses B, B uses C, and C is about to use A, this error
    /// contains `[C, A, B, C]`.
    #[error("Cycle detected: {}", format_cycle_path(.path))]
    Cycle { path: Vec<DiceId> },

    /// A registry lookup referenced a name that was never defined.
    #[error("Unknown dice expression: {0}")]
    UnknownDice(DiceId),

    /// A frequency map could not be converted to or from JSON.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Face arithmetic left the `i64` range while evaluating.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

impl DiceError {
    pub(crate) fn invalid(component: &'static str, reason: impl Into<String>) -> Self {
        DiceError::InvalidConfiguration {
            component,
            reason: reason.into(),
        }
    }
}
