//! Control points of the generated transition system.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::Error;
use crate::ir::Unit;

/// A control point.
///
/// A *defined* label is the name of a jump target in the method body; a
/// synthesized label only sequences two statements. Compaction never merges
/// across a defined label.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Label {
    name: String,
    defined: bool,
}

impl Label {
    pub fn defined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defined: true,
        }
    }

    pub fn synthesized(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defined: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Assigns a control point to every statement of a method body.
///
/// Statements carrying a label name get the defined label of that name.
/// Silent statements (see [`Stmt::is_silent`](crate::ir::Stmt::is_silent))
/// without a label share the point of the statement after them. Every other
/// statement starts at a new synthesized point `l<N>`, numbered in statement
/// order. One more synthesized point follows the last statement.
#[derive(Debug, Clone)]
pub struct LabelMaker {
    entries: Vec<Label>,
    exit: Label,
    targets: HashMap<String, Label>,
}

impl LabelMaker {
    pub fn new(units: &[Unit]) -> Self {
        let targets: HashMap<String, Label> = units
            .iter()
            .filter_map(|u| u.label.as_ref())
            .map(|name| (name.clone(), Label::defined(name.clone())))
            .collect();
        let taken: HashSet<&str> = targets.keys().map(String::as_str).collect();

        let mut counter = 0usize;
        let mut next_point = || loop {
            let name = format!("l{}", counter);
            counter += 1;
            if !taken.contains(name.as_str()) {
                return Label::synthesized(name);
            }
        };

        let mut points: Vec<Option<Label>> = units
            .iter()
            .map(|u| match &u.label {
                Some(name) => Some(Label::defined(name.clone())),
                None if u.stmt.is_silent() => None,
                None => Some(next_point()),
            })
            .collect();
        let exit = next_point();

        let mut next = exit.clone();
        for point in points.iter_mut().rev() {
            match point {
                Some(label) => next = label.clone(),
                None => *point = Some(next.clone()),
            }
        }
        let entries = points.into_iter().flatten().collect();

        Self { entries, exit, targets }
    }

    /// The point of the first statement.
    pub fn start(&self) -> &Label {
        self.entries.first().unwrap_or(&self.exit)
    }

    /// The point in front of statement `index`.
    pub fn current(&self, index: usize) -> &Label {
        self.entries.get(index).unwrap_or(&self.exit)
    }

    /// The point reached when statement `index` completes normally.
    pub fn fallthrough(&self, index: usize) -> &Label {
        self.current(index + 1)
    }

    /// The point after the last statement.
    pub fn exit(&self) -> &Label {
        &self.exit
    }

    /// The defined label a jump to `name` lands on.
    pub fn target(&self, name: &str) -> Result<&Label, Error> {
        self.targets.get(name).ok_or_else(|| Error::UnreachableLabel {
            label: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Local, Stmt, Type};

    use test_log::test;

    fn identity(name: &str) -> Stmt {
        Stmt::Identity {
            local: Local::new(name, Type::Int),
        }
    }

    #[test]
    fn test_synthesized_points() {
        let units = vec![Unit::new(Stmt::Nop), Unit::new(Stmt::Return(None))];
        let labels = LabelMaker::new(&units);
        assert_eq!(labels.current(0), &Label::synthesized("l0"));
        assert_eq!(labels.current(1), &Label::synthesized("l0"));
        assert_eq!(labels.fallthrough(1), &Label::synthesized("l1"));
        assert_eq!(labels.exit(), &Label::synthesized("l1"));
        assert_eq!(labels.start(), &Label::synthesized("l0"));
    }

    #[test]
    fn test_silent_share_next_point() {
        let units = vec![
            Unit::new(identity("r0")),
            Unit::new(identity("i0")),
            Unit::labelled("label1", Stmt::Goto { target: "label1".into() }),
        ];
        let labels = LabelMaker::new(&units);
        assert_eq!(labels.start(), &Label::defined("label1"));
        assert_eq!(labels.current(1), &Label::defined("label1"));
        assert_eq!(labels.fallthrough(2), &Label::synthesized("l0"));
        assert!(labels.target("label1").unwrap().is_defined());
    }

    #[test]
    fn test_unknown_target() {
        let labels = LabelMaker::new(&[]);
        assert_eq!(labels.start(), labels.exit());
        assert!(matches!(
            labels.target("nowhere"),
            Err(Error::UnreachableLabel { label }) if label == "nowhere"
        ));
    }

    #[test]
    fn test_synthesized_avoid_defined_names() {
        let units = vec![
            Unit::labelled("l0", Stmt::Nop),
            Unit::new(Stmt::Return(None)),
        ];
        let labels = LabelMaker::new(&units);
        assert_eq!(labels.current(0), &Label::defined("l0"));
        assert_eq!(labels.current(1), &Label::synthesized("l1"));
        assert_eq!(labels.exit(), &Label::synthesized("l2"));
    }
}
