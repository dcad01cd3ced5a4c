//! Size abstractions of heap accesses.
//!
//! A reference-typed observable holds an abstract *size* of the structure it
//! points to. All strategies share these assumptions:
//!
//! - `null` has size 0 and every other object a positive size;
//! - equal references have equal sizes;
//! - a new object has size 1 and a new array of length `n` has size `n`.
//!
//! Reading a field gives the size of a substructure, writing a field may grow
//! the structure. Reads return `None` when the strategy knows nothing about the
//! value read, in which case the caller assigns an unconstrained value.

use std::fmt;
use std::str::FromStr;

use crate::aexpr::AExpr;
use crate::constraint::Constraint;
use crate::formula::Formula;
use crate::ir::{Field, Local};
use crate::types::Var;

pub trait SizeAbstraction {
    /// `target = base.field`
    fn get_instance_field(&self, target: &Local, base: &Local, field: &Field) -> Option<Formula>;

    /// `base.field = value`
    fn put_instance_field(&self, base: &Local, field: &Field, value: &AExpr) -> Formula;

    /// `target = Class.field`
    ///
    /// Static fields are observables of their own and read like locals.
    fn get_static_field(&self, target: &Local, field: &Field) -> Option<Formula> {
        Some(Formula::atom([Constraint::assign(
            Var::post(target.name.clone()),
            Var::new(field.symbol()),
        )]))
    }

    /// `Class.field = value`
    fn put_static_field(&self, field: &Field, value: &AExpr) -> Formula {
        Formula::atom([Constraint::assign(Var::post(field.symbol()), value.clone())])
    }

    /// `target = base[i]`: the content of arrays is not tracked.
    fn get_array_elem(&self, _target: &Local, _base: &Local) -> Option<Formula> {
        None
    }

    /// `base[i] = value`: an update keeps the length of the array.
    fn put_array_elem(&self, _base: &Local, _value: &AExpr) -> Formula {
        Formula::identity()
    }
}

/// Field-sensitive sizes: the size of an object bounds the absolute value of
/// its integer fields and the size of the objects it points to.
///
/// Reachability and cyclicity are ignored.
#[derive(Debug, Default, Copy, Clone)]
pub struct NodeFields;

impl SizeAbstraction for NodeFields {
    fn get_instance_field(&self, target: &Local, base: &Local, field: &Field) -> Option<Formula> {
        let x = Var::post(target.name.clone());
        let y = AExpr::var(Var::new(base.name.clone()));
        if target.ty.is_integral() && field.ty.is_integral() {
            Some(Formula::atom([
                Constraint::gt(x.clone(), -y.clone()),
                Constraint::lt(x, y),
            ]))
        } else if target.ty.is_reference() && field.ty.is_reference() {
            Some(Formula::atom([Constraint::nonnegative(x.clone()), Constraint::lt(x, y)]))
        } else {
            None
        }
    }

    fn put_instance_field(&self, base: &Local, field: &Field, value: &AExpr) -> Formula {
        let y = Var::new(base.name.clone());
        let y_post = y.to_post();
        if field.ty.is_reference() {
            Formula::atom([
                Constraint::positive(y_post.clone()),
                Constraint::le(y_post, AExpr::var(y) + value.clone()),
            ])
        } else if field.ty.is_integral() {
            Formula::atom([
                Constraint::nonnegative(value.clone()),
                Constraint::positive(y_post.clone()),
                Constraint::le(y_post.clone(), AExpr::var(y.clone()) + value.clone()),
            ])
            .or([
                Constraint::negative(value.clone()),
                Constraint::positive(y_post.clone()),
                Constraint::le(y_post, AExpr::var(y) - value.clone()),
            ])
        } else {
            Formula::identity()
        }
    }
}

/// Field-insensitive sizes: the length of the longest acyclic path.
///
/// Only reference fields contribute to the size.
#[derive(Debug, Default, Copy, Clone)]
pub struct SimplePathLength;

impl SizeAbstraction for SimplePathLength {
    fn get_instance_field(&self, target: &Local, base: &Local, field: &Field) -> Option<Formula> {
        if target.ty.is_reference() && field.ty.is_reference() {
            let x = Var::post(target.name.clone());
            Some(Formula::atom([
                Constraint::nonnegative(x.clone()),
                Constraint::lt(x, Var::new(base.name.clone())),
            ]))
        } else {
            None
        }
    }

    fn put_instance_field(&self, base: &Local, field: &Field, value: &AExpr) -> Formula {
        let y = Var::new(base.name.clone());
        let y_post = y.to_post();
        if field.ty.is_reference() {
            Formula::atom([
                Constraint::positive(y_post.clone()),
                Constraint::le(y_post, AExpr::var(y) + value.clone()),
            ])
        } else {
            Formula::atom([Constraint::positive(y_post.clone()), Constraint::eq(y_post, y)])
        }
    }
}

/// Selects one of the built-in size abstractions.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Abstraction {
    #[default]
    NodeFields,
    SimplePathLength,
}

impl Abstraction {
    pub fn strategy(self) -> &'static dyn SizeAbstraction {
        match self {
            Abstraction::NodeFields => &NodeFields,
            Abstraction::SimplePathLength => &SimplePathLength,
        }
    }
}

impl fmt::Display for Abstraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Abstraction::NodeFields => write!(f, "node-fields"),
            Abstraction::SimplePathLength => write!(f, "path-length"),
        }
    }
}

impl FromStr for Abstraction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node-fields" => Ok(Abstraction::NodeFields),
            "path-length" => Ok(Abstraction::SimplePathLength),
            _ => Err(format!("unknown size abstraction `{}`, expected `node-fields` or `path-length`", s)),
        }
    }
}
