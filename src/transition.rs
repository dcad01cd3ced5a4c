//! Edges of the transition graph and their compaction.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::aexpr::AExpr;
use crate::formula::Formula;
use crate::fresh::Fresh;
use crate::label::Label;

/// A guarded edge `from -> to`.
///
/// `lower` and `upper` are the cost of taking the edge. They only matter when
/// edges are merged, where they add up.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transition {
    pub from: Label,
    pub guard: Formula,
    pub to: Label,
    pub lower: AExpr,
    pub upper: AExpr,
}

impl Transition {
    /// An edge of unit cost.
    pub fn new(from: Label, guard: Formula, to: Label) -> Self {
        Self {
            from,
            guard,
            to,
            lower: AExpr::one(),
            upper: AExpr::one(),
        }
    }

    /// An unconditional edge of unit cost.
    pub fn unguarded(from: Label, to: Label) -> Self {
        Self::new(from, Formula::identity(), to)
    }

    pub fn with_cost(mut self, lower: AExpr, upper: AExpr) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// The edge `self.from -> next.to` performing `self`, then `next`.
    pub fn then(self, next: Transition, fresh: &mut Fresh) -> Transition {
        Transition {
            from: self.from,
            guard: Formula::compose(self.guard, next.guard, fresh),
            to: next.to,
            lower: self.lower + next.lower,
            upper: self.upper + next.upper,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} : {}", self.from, self.to, self.guard)
    }
}

/// Edges in translation order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Transitions {
    transitions: Vec<Transition>,
}

impl Transitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Appends the unit-cost edge `from -> to` guarded by `guard`.
    pub fn add(&mut self, from: Label, guard: Formula, to: Label) {
        self.push(Transition::new(from, guard, to));
    }

    pub fn first(&self) -> Option<&Transition> {
        self.transitions.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// See [`compact`].
    pub fn compact(&self, fresh: &mut Fresh) -> Transitions {
        compact(self, fresh)
    }
}

impl Extend<Transition> for Transitions {
    fn extend<I: IntoIterator<Item = Transition>>(&mut self, iter: I) {
        self.transitions.extend(iter);
    }
}

impl FromIterator<Transition> for Transitions {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        Self {
            transitions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Transitions {
    type Item = Transition;
    type IntoIter = std::vec::IntoIter<Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.into_iter()
    }
}

impl<'a> IntoIterator for &'a Transitions {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}

impl fmt::Display for Transitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in self.transitions.iter() {
            writeln!(f, "{}", t)?;
        }
        Ok(())
    }
}

/// Merges chains of edges through synthesized points.
///
/// The edges are scanned once, left to right. An edge `t` is merged into the
/// previously emitted edge `p` when `p.to == t.from`, that point is not a
/// defined label, and the point has exactly one incoming and one outgoing
/// edge in `transitions`. Merging composes the guards and adds the costs.
///
/// An edge whose guard has no clause never fires and is never merged:
/// composing through it would make the path behind it live.
///
/// The result keeps every defined label and compacting it again changes
/// nothing.
pub fn compact(transitions: &Transitions, fresh: &mut Fresh) -> Transitions {
    let mut incoming: HashMap<&Label, usize> = HashMap::new();
    let mut outgoing: HashMap<&Label, usize> = HashMap::new();
    for t in transitions.iter() {
        *outgoing.entry(&t.from).or_default() += 1;
        *incoming.entry(&t.to).or_default() += 1;
    }
    let is_link = |label: &Label| {
        !label.is_defined() && incoming.get(label) == Some(&1) && outgoing.get(label) == Some(&1)
    };
    let live = |t: &Transition| !t.guard.is_empty();

    let mut result: Vec<Transition> = Vec::with_capacity(transitions.len());
    for t in transitions.iter() {
        match result.pop() {
            Some(p) if p.to == t.from && is_link(&t.from) && live(&p) && live(t) => {
                debug!("merging {} and {} at {}", p.from, t.to, t.from);
                result.push(p.then(t.clone(), fresh));
            }
            Some(p) => {
                result.push(p);
                result.push(t.clone());
            }
            None => result.push(t.clone()),
        }
    }
    debug!("compacted {} edges into {}", transitions.len(), result.len());

    Transitions { transitions: result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::types::Var;

    use test_log::test;

    fn inc(name: &str) -> Formula {
        let x = Var::new(name);
        Formula::atom([Constraint::assign(x.to_post(), AExpr::var(x) + AExpr::one())])
    }

    fn l(name: &str) -> Label {
        Label::synthesized(name)
    }

    #[test]
    fn test_compact_chain() {
        let ts: Transitions = [
            Transition::new(l("a"), inc("x"), l("b")),
            Transition::new(l("b"), inc("y"), l("c")),
            Transition::new(l("c"), inc("x"), l("d")),
        ]
        .into_iter()
        .collect();
        let mut fresh = Fresh::new();
        let compacted = ts.compact(&mut fresh);
        assert_eq!(compacted.len(), 1);
        let t = compacted.first().unwrap();
        assert_eq!(t.from, l("a"));
        assert_eq!(t.to, l("d"));
        assert_eq!(t.guard.len(), 1);
        assert_eq!(t.lower.to_string(), "((1 + 1) + 1)");
        // x is redefined by the third edge
        assert_eq!(fresh.imm(), Var::new("imm_1"));
    }

    #[test]
    fn test_compact_keeps_defined_labels() {
        let ts: Transitions = [
            Transition::new(l("a"), inc("x"), Label::defined("loop")),
            Transition::new(Label::defined("loop"), inc("y"), l("c")),
        ]
        .into_iter()
        .collect();
        let compacted = ts.compact(&mut Fresh::new());
        assert_eq!(compacted, ts);
    }

    #[test]
    fn test_compact_keeps_branch_points() {
        let ts: Transitions = [
            Transition::new(l("a"), inc("x"), l("b")),
            Transition::new(l("b"), inc("y"), l("c")),
            Transition::new(l("b"), inc("z"), l("d")),
        ]
        .into_iter()
        .collect();
        let compacted = ts.compact(&mut Fresh::new());
        assert_eq!(compacted, ts);
    }

    #[test]
    fn test_compact_idempotent() {
        let ts: Transitions = [
            Transition::new(l("a"), inc("x"), l("b")),
            Transition::new(l("b"), inc("y"), Label::defined("loop")),
            Transition::new(Label::defined("loop"), inc("x"), l("c")),
            Transition::new(l("c"), Formula::identity(), l("d")),
            Transition::new(l("d"), inc("y"), Label::defined("loop")),
            Transition::new(Label::defined("loop"), Formula::identity(), l("e")),
        ]
        .into_iter()
        .collect();
        let mut fresh = Fresh::new();
        let once = ts.compact(&mut fresh);
        assert_eq!(once.len(), 3);
        let twice = once.compact(&mut fresh);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_compact_stops_at_dead_edges() {
        let ts: Transitions = [
            Transition::new(l("a"), inc("x"), l("b")),
            Transition::new(l("b"), Formula::empty(), l("c")),
            Transition::new(l("c"), inc("y"), l("d")),
        ]
        .into_iter()
        .collect();
        let compacted = ts.compact(&mut Fresh::new());
        assert_eq!(compacted, ts);
    }

    #[test]
    fn test_compact_empty() {
        assert!(Transitions::new().compact(&mut Fresh::new()).is_empty());
    }
}
