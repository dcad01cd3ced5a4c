use std::fmt;

use crate::ir::Body;
use crate::types::Var;

/// The ordered observables of one method: the argument tuple of every state
/// of its transition system.
///
/// Insertion order is kept and duplicates are ignored.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Domain {
    vars: Vec<Var>,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// All locals of `body`, then the static `short`/`int`/`long` fields of
    /// its class as `Class.field`.
    pub fn from_body(body: &Body) -> Self {
        let mut domain = Domain::new();
        for local in body.locals.iter() {
            domain.push(Var::new(local.name.clone()));
        }
        for field in body.fields.iter() {
            if field.is_static && field.ty.is_tracked_primitive() {
                domain.push(Var::new(field.symbol()));
            }
        }
        domain
    }

    /// Appends `var` as a pre-variable unless it is already present.
    pub fn push(&mut self, var: Var) {
        let var = var.to_pre();
        if !self.vars.contains(&var) {
            self.vars.push(var);
        }
    }

    pub fn contains(&self, var: &Var) -> bool {
        self.vars.contains(&var.to_pre())
    }

    pub fn vars(&self) -> &[Var] {
        &self.vars
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Var> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl FromIterator<Var> for Domain {
    fn from_iter<I: IntoIterator<Item = Var>>(iter: I) -> Self {
        let mut domain = Domain::new();
        for var in iter {
            domain.push(var);
        }
        domain
    }
}

impl<'a> IntoIterator for &'a Domain {
    type Item = &'a Var;
    type IntoIter = std::slice::Iter<'a, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.vars.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Field, Local, MethodRef, Type};

    use test_log::test;

    #[test]
    fn test_from_body() {
        let body = Body::new(MethodRef::new("Foo", "bar", "(I)V"))
            .with_locals([
                Local::new("r0", Type::Ref("Foo".into())),
                Local::new("i0", Type::Int),
            ])
            .with_fields([
                Field::new("Foo", "count", Type::Int, true),
                Field::new("Foo", "flag", Type::Boolean, true),
                Field::new("Foo", "size", Type::Long, false),
                Field::new("Foo", "total", Type::Long, true),
            ]);
        let domain = Domain::from_body(&body);
        let names: Vec<&str> = domain.iter().map(Var::symbol).collect();
        assert_eq!(names, vec!["r0", "i0", "Foo.count", "Foo.total"]);
    }

    #[test]
    fn test_duplicates_and_post_forms() {
        let domain: Domain = [Var::new("x"), Var::post("x"), Var::new("y")].into_iter().collect();
        assert_eq!(domain.len(), 2);
        assert!(domain.contains(&Var::post("y")));
        assert_eq!(domain.to_string(), "x, y");
    }
}
