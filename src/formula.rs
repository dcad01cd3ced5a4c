//! Guards of transitions in disjunctive normal form.
//!
//! A [`Clause`] is a conjunction of [`Constraint`]s, a [`Formula`] is a
//! disjunction of clauses. Two formulas play a special role:
//!
//! - [`Formula::empty`] has **no** clause. It marks a transition without a
//!   defined effect; such a transition is never emitted.
//! - [`Formula::identity`] has exactly **one empty** clause. It is the
//!   vacuously true guard of an unconditional transition.
//!
//! Formulas are values: every operation returns a new formula and leaves its
//! inputs untouched, so one formula can be reused on several branches.
//!
//! # Composition
//!
//! [`Formula::compose`] sequences two guarded effects. Within one clause a
//! pre-variable `x` is the value before and a post-variable `x'` the value
//! after the effect. For each pair of clauses `(c1, c2)` and each `x'` in `c1`:
//!
//! - if `c2` does not define `x'`, the pre-variable `x` in `c2` is replaced by
//!   `x'` (the second effect reads the value the first one produced);
//! - if `c2` also defines `x'`, a fresh intermediate variable `v` replaces
//!   `x'` in `c1` and `x` in `c2`.
//!
//! The clauses of the result are the cross product of both operands. The
//! empty formula is the identity of composition.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::trace;

use crate::aexpr::AExpr;
use crate::constraint::Constraint;
use crate::fresh::Fresh;
use crate::types::Var;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Clause {
    constraints: Vec<Constraint>,
}

impl Clause {
    /// The vacuously true clause.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` for the vacuously true clause.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn substitute(&self, map: &HashMap<Var, AExpr>) -> Clause {
        self.constraints.iter().map(|c| c.substitute(map)).collect()
    }

    pub fn has_var(&self, var: &Var) -> bool {
        self.constraints.iter().any(|c| c.has_var(var))
    }

    pub fn collect_vars<P>(&self, vars: &mut BTreeSet<Var>, pred: &P)
    where
        P: Fn(&Var) -> bool,
    {
        for c in self.constraints.iter() {
            c.collect_vars(vars, pred);
        }
    }

    pub fn free_vars<P>(&self, pred: P) -> BTreeSet<Var>
    where
        P: Fn(&Var) -> bool,
    {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars, &pred);
        vars
    }

    pub fn post_vars(&self) -> BTreeSet<Var> {
        self.free_vars(Var::is_post)
    }

    /// Sequential composition of two clauses, see the [module documentation](self).
    pub fn compose(c1: &Clause, c2: &Clause, fresh: &mut Fresh) -> Clause {
        let posts2 = c2.post_vars();

        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for post in c1.post_vars() {
            let pre = post.to_pre();
            if posts2.contains(&post) {
                let imm = fresh.imm();
                trace!("compose: linking {} through {}", post, imm);
                first.insert(post, AExpr::var(imm.clone()));
                second.insert(pre, AExpr::var(imm));
            } else {
                second.insert(pre, AExpr::var(post));
            }
        }

        let mut composed = c1.substitute(&first);
        composed.constraints.extend(c2.substitute(&second).constraints);
        composed
    }
}

impl FromIterator<Constraint> for Clause {
    fn from_iter<T: IntoIterator<Item = Constraint>>(iter: T) -> Self {
        Clause {
            constraints: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return write!(f, "TRUE");
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Formula {
    clauses: Vec<Clause>,
}

impl Formula {
    /// The formula without clauses: no defined effect.
    pub fn empty() -> Self {
        Self { clauses: Vec::new() }
    }

    /// The formula with a single vacuously true clause.
    pub fn identity() -> Self {
        Self {
            clauses: vec![Clause::new()],
        }
    }

    /// One clause holding the conjunction of `constraints`.
    pub fn atom(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Self {
            clauses: vec![constraints.into_iter().collect()],
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns `true` for the formula without clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns `true` for a formula with one vacuously true clause.
    pub fn is_identity(&self) -> bool {
        self.clauses.len() == 1 && self.clauses[0].is_empty()
    }

    /// Conjoins `constraints` to every clause.
    pub fn and(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        let constraints: Vec<Constraint> = constraints.into_iter().collect();
        for clause in self.clauses.iter_mut() {
            clause.constraints.extend(constraints.iter().cloned());
        }
        self
    }

    /// Adds the conjunction of `constraints` as a new clause.
    pub fn or(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.clauses.push(constraints.into_iter().collect());
        self
    }

    pub fn substitute(&self, map: &HashMap<Var, AExpr>) -> Formula {
        Formula {
            clauses: self.clauses.iter().map(|c| c.substitute(map)).collect(),
        }
    }

    pub fn substitute_var(&self, var: &Var, expr: &AExpr) -> Formula {
        let mut map = HashMap::new();
        map.insert(var.clone(), expr.clone());
        self.substitute(&map)
    }

    pub fn has_var(&self, var: &Var) -> bool {
        self.clauses.iter().any(|c| c.has_var(var))
    }

    pub fn free_vars<P>(&self, pred: P) -> BTreeSet<Var>
    where
        P: Fn(&Var) -> bool,
    {
        let mut vars = BTreeSet::new();
        for c in self.clauses.iter() {
            c.collect_vars(&mut vars, &pred);
        }
        vars
    }

    /// Sequential composition: first `lhs`, then `rhs`.
    pub fn compose(lhs: Formula, rhs: Formula, fresh: &mut Fresh) -> Formula {
        if lhs.is_empty() {
            return rhs;
        }
        if rhs.is_empty() {
            return lhs;
        }
        let mut clauses = Vec::with_capacity(lhs.len() * rhs.len());
        for c1 in lhs.clauses.iter() {
            for c2 in rhs.clauses.iter() {
                clauses.push(Clause::compose(c1, c2, fresh));
            }
        }
        Formula { clauses }
    }
}

impl From<Constraint> for Formula {
    fn from(constraint: Constraint) -> Self {
        Formula::atom([constraint])
    }
}

impl<'a> IntoIterator for &'a Formula {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "FALSE");
        }
        for (i, c) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " || ")?;
            }
            write!(f, "({})", c)?;
        }
        Ok(())
    }
}
