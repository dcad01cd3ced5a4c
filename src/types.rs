//! Observables of the transition system.
//!
//! Every integer-valued observable (a local, a static field, a placeholder of a
//! method summary, a fresh value) is a [`Var`]. A variable exists in two forms:
//! the *pre* form `x` denotes the value before a transition fires, the *post*
//! form `x'` denotes the value after it.
use std::fmt;

/// A pre- or post-variable.
///
/// # Invariants
///
/// - Equality and hashing take both the symbol and the post flag into account,
///   so `x` and `x'` are distinct variables.
/// - The symbol never carries the trailing `'` itself.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var {
    symbol: String,
    post: bool,
}

impl Var {
    /// Creates a pre-variable.
    pub fn new(symbol: impl Into<String>) -> Self {
        Var {
            symbol: symbol.into(),
            post: false,
        }
    }

    /// Creates a post-variable.
    pub fn post(symbol: impl Into<String>) -> Self {
        Var {
            symbol: symbol.into(),
            post: true,
        }
    }

    /// Returns the plain symbol, without the post marker.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_post(&self) -> bool {
        self.post
    }

    pub fn is_pre(&self) -> bool {
        !self.post
    }

    /// Returns the post form of this variable.
    pub fn to_post(&self) -> Self {
        Var::post(self.symbol.clone())
    }

    /// Returns the pre form of this variable.
    pub fn to_pre(&self) -> Self {
        Var::new(self.symbol.clone())
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.post {
            write!(f, "{}'", self.symbol)
        } else {
            write!(f, "{}", self.symbol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_pre_post_distinct() {
        let x = Var::new("x");
        let xp = Var::post("x");
        assert_ne!(x, xp);
        assert_eq!(x.to_post(), xp);
        assert_eq!(xp.to_pre(), x);
        assert!(x.is_pre());
        assert!(xp.is_post());
    }

    #[test]
    fn test_display() {
        assert_eq!(Var::new("i0").to_string(), "i0");
        assert_eq!(Var::post("i0").to_string(), "i0'");
        assert_eq!(Var::post("Loop.Max").to_string(), "Loop.Max'");
    }
}
