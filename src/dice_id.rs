//! Names for registered dice expressions.

use std::fmt;
use std::sync::Arc;

/// Name of an expression in a [`DiceRegistry`](crate::registry::DiceRegistry).
///
/// Backed by an `Arc<str>`; graph nodes, cache keys and error paths all
/// hold clones of the same name.
///
/// ```rust
/// use exactdice::DiceId;
///
/// let pool = DiceId::new("4d6");
/// assert_eq!(pool, DiceId::from(String::from("4d6")));
/// assert_eq!(pool.to_string(), "4d6");
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiceId(Arc<str>);

impl DiceId {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DiceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DiceId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for DiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
