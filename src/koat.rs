//! Complexity problems in the rule format read by KoAT.
//!
//! ```text
//! (GOAL COMPLEXITY)
//! (STARTTERM (FUNCTIONSYMBOLS l0))
//! (VAR )
//! (RULES
//! l0(i, n) -> l1(i', n) :|: i' = 0
//! l1(i, n) -> l2(i, n) :|: i < n
//! )
//! ```
//!
//! Every state term lists the whole domain. The left-hand side uses the
//! pre-variables; the right-hand side uses `x'` for each variable the clause
//! mentions in post form and `x` otherwise. A transition yields one rule per
//! clause of its guard, so a guard without clauses yields no rule and the
//! vacuously true clause yields a rule without constraint.

use std::fmt;

use crate::domain::Domain;
use crate::formula::Clause;
use crate::fresh::Fresh;
use crate::label::Label;
use crate::transition::{Transition, Transitions};

/// The transition system of one method.
#[derive(Debug, Clone)]
pub struct KoatProblem {
    domain: Domain,
    transitions: Transitions,
    fresh: Fresh,
}

impl KoatProblem {
    pub fn new(domain: Domain, transitions: Transitions) -> Self {
        Self::with_fresh(domain, transitions, Fresh::new())
    }

    /// A problem whose fresh variables were drawn from `fresh`.
    pub fn with_fresh(domain: Domain, transitions: Transitions, fresh: Fresh) -> Self {
        Self {
            domain,
            transitions,
            fresh,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// The source of the first transition.
    pub fn start_label(&self) -> Option<&Label> {
        self.transitions.first().map(|t| &t.from)
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    /// The same problem with chains of transitions merged.
    pub fn compact(&self) -> KoatProblem {
        let mut fresh = self.fresh.clone();
        let transitions = self.transitions.compact(&mut fresh);
        KoatProblem {
            domain: self.domain.clone(),
            transitions,
            fresh,
        }
    }

    fn write_pre(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.domain.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }

    fn write_post(&self, f: &mut fmt::Formatter<'_>, clause: &Clause) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.domain.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let post = v.to_post();
            if clause.has_var(&post) {
                write!(f, "{}", post)?;
            } else {
                write!(f, "{}", v)?;
            }
        }
        write!(f, ")")
    }
}

impl<'a> IntoIterator for &'a KoatProblem {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}

impl fmt::Display for KoatProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(GOAL COMPLEXITY)")?;
        let start = match self.start_label() {
            Some(start) => start,
            None => {
                writeln!(f, "(STARTTERM (FUNCTIONSYMBOLS start))")?;
                return writeln!(f, "start(x) -> end(x)");
            }
        };
        writeln!(f, "(STARTTERM (FUNCTIONSYMBOLS {}))", start)?;
        writeln!(f, "(VAR )")?;
        writeln!(f, "(RULES")?;
        for t in self.transitions.iter() {
            for clause in t.guard.iter() {
                write!(f, "{}", t.from)?;
                self.write_pre(f)?;
                write!(f, " -> {}", t.to)?;
                self.write_post(f, clause)?;
                if !clause.is_empty() {
                    write!(f, " :|: {}", clause)?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f, ")")
    }
}
