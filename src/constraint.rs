//! Atomic relations between arithmetic expressions.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::aexpr::AExpr;
use crate::types::Var;

/// Relation symbol of a [`Constraint`].
///
/// [`Rel::Assign`] is an oriented equation `lhs := rhs`. It marks a pre/post
/// pair that changed and is printed exactly like [`Rel::Eq`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Rel {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Assign,
}

impl fmt::Display for Rel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rel::Lt => "<",
            Rel::Le => "<=",
            Rel::Eq | Rel::Assign => "=",
            Rel::Ge => ">=",
            Rel::Gt => ">",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Constraint {
    pub lhs: AExpr,
    pub rel: Rel,
    pub rhs: AExpr,
}

impl Constraint {
    pub fn new(lhs: impl Into<AExpr>, rel: Rel, rhs: impl Into<AExpr>) -> Self {
        Self {
            lhs: lhs.into(),
            rel,
            rhs: rhs.into(),
        }
    }

    pub fn lt(lhs: impl Into<AExpr>, rhs: impl Into<AExpr>) -> Self {
        Self::new(lhs, Rel::Lt, rhs)
    }

    pub fn le(lhs: impl Into<AExpr>, rhs: impl Into<AExpr>) -> Self {
        Self::new(lhs, Rel::Le, rhs)
    }

    pub fn eq(lhs: impl Into<AExpr>, rhs: impl Into<AExpr>) -> Self {
        Self::new(lhs, Rel::Eq, rhs)
    }

    pub fn ge(lhs: impl Into<AExpr>, rhs: impl Into<AExpr>) -> Self {
        Self::new(lhs, Rel::Ge, rhs)
    }

    pub fn gt(lhs: impl Into<AExpr>, rhs: impl Into<AExpr>) -> Self {
        Self::new(lhs, Rel::Gt, rhs)
    }

    /// `lhs := rhs`.
    pub fn assign(lhs: impl Into<AExpr>, rhs: impl Into<AExpr>) -> Self {
        Self::new(lhs, Rel::Assign, rhs)
    }

    /// `e > 0`
    pub fn positive(e: impl Into<AExpr>) -> Self {
        Self::gt(e, AExpr::zero())
    }

    /// `e >= 0`
    pub fn nonnegative(e: impl Into<AExpr>) -> Self {
        Self::ge(e, AExpr::zero())
    }

    /// `e < 0`
    pub fn negative(e: impl Into<AExpr>) -> Self {
        Self::lt(e, AExpr::zero())
    }

    pub fn substitute(&self, map: &HashMap<Var, AExpr>) -> Constraint {
        Constraint {
            lhs: self.lhs.substitute(map),
            rel: self.rel,
            rhs: self.rhs.substitute(map),
        }
    }

    pub fn has_var(&self, var: &Var) -> bool {
        self.lhs.has_var(var) || self.rhs.has_var(var)
    }

    pub fn collect_vars<P>(&self, vars: &mut BTreeSet<Var>, pred: &P)
    where
        P: Fn(&Var) -> bool,
    {
        self.lhs.collect_vars(vars, pred);
        self.rhs.collect_vars(vars, pred);
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.rel, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_display() {
        let x = Var::new("x");
        assert_eq!(Constraint::le(x.clone(), 3i64).to_string(), "x <= 3");
        assert_eq!(Constraint::assign(x.to_post(), AExpr::var(x.clone()) + AExpr::one()).to_string(), "x' = (x + 1)");
        assert_eq!(Constraint::eq(x.clone(), -2i64).to_string(), "x = (-2)");
        assert_eq!(Constraint::positive(x.clone()).to_string(), "x > 0");
        assert_eq!(Constraint::nonnegative(x.clone()).to_string(), "x >= 0");
        assert_eq!(Constraint::negative(x).to_string(), "x < 0");
    }

    #[test]
    fn test_assign_prints_like_eq() {
        let x = Var::new("x");
        assert_eq!(
            Constraint::assign(x.to_post(), 1i64).to_string(),
            Constraint::eq(x.to_post(), 1i64).to_string()
        );
        assert_ne!(Constraint::assign(x.to_post(), 1i64), Constraint::eq(x.to_post(), 1i64));
    }
}
