//! Supply of fresh variables.
//!
//! A [`Fresh`] is owned by one translation run and threaded through it
//! explicitly, so two runs over the same body produce the same names.

use crate::types::Var;

#[derive(Debug, Default, Clone)]
pub struct Fresh {
    vars: usize,
    imms: usize,
    rets: usize,
}

impl Fresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// An unconstrained value, e.g. the result of an unsupported operation.
    pub fn var(&mut self) -> Var {
        let v = Var::new(format!("fresh_{}", self.vars));
        self.vars += 1;
        v
    }

    /// An intermediate value linking two composed transitions.
    pub fn imm(&mut self) -> Var {
        let v = Var::new(format!("imm_{}", self.imms));
        self.imms += 1;
        v
    }

    /// The result of one call site.
    pub fn ret(&mut self) -> Var {
        let v = Var::new(format!("ret_{}", self.rets));
        self.rets += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_monotonic() {
        let mut fresh = Fresh::new();
        assert_eq!(fresh.var(), Var::new("fresh_0"));
        assert_eq!(fresh.var(), Var::new("fresh_1"));
        assert_eq!(fresh.imm(), Var::new("imm_0"));
        assert_eq!(fresh.ret(), Var::new("ret_0"));
        assert_eq!(fresh.var(), Var::new("fresh_2"));
    }

    #[test]
    fn test_independent_runs() {
        let mut a = Fresh::new();
        let mut b = Fresh::new();
        a.var();
        assert_eq!(b.var(), Var::new("fresh_0"));
    }
}
