//! Translation of method bodies into transition systems.
//!
//! Every statement becomes a (possibly empty) set of guarded edges between
//! the control points assigned by the [`LabelMaker`]:
//!
//! | statement | edges |
//! |---|---|
//! | assignment, call | `current -> fallthrough` with the effect as guard |
//! | `goto` | `current -> target`, unguarded |
//! | `if` | the condition to the target, its negation to the fallthrough |
//! | `switch` | unguarded edges to the default and to every case |
//! | `return`, `throw` | none |
//! | identity, `nop`, monitors, breakpoints | `current -> fallthrough` if labelled, else none |
//!
//! Values the translation cannot express (division, bitwise operations,
//! narrowing casts, array contents and the like) become *undefined*: an
//! integer target gets an unconstrained fresh value, a reference target only
//! keeps its size non-negative. Shapes without any rule abort the translation
//! of the method with [`Error::UnsupportedConstruct`].

use std::collections::HashMap;

use log::{debug, trace};

use crate::aexpr::AExpr;
use crate::constraint::Constraint;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::domain::Domain;
use crate::error::Error;
use crate::formula::Formula;
use crate::fresh::Fresh;
use crate::ir::{BinOp, Body, CondOp, Condition, Constant, Immediate, Invoke, InvokeKind, LValue, Local, RValue, Stmt};
use crate::koat::KoatProblem;
use crate::label::{Label, LabelMaker};
use crate::size::{Abstraction, SizeAbstraction};
use crate::summary::{MethodSummaries, MethodSummary};
use crate::transition::{Transition, Transitions};
use crate::types::Var;

/// Options of a translation.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct TranslateConfig {
    /// Size abstraction for heap accesses.
    pub abstraction: Abstraction,
    /// Whether the driver also produces the compacted problem.
    pub compact: bool,
}

impl TranslateConfig {
    pub fn with_abstraction(mut self, abstraction: Abstraction) -> Self {
        self.abstraction = abstraction;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

/// Translates method bodies against a fixed table of method summaries.
#[derive(Debug, Clone)]
pub struct Translator<'a> {
    summaries: &'a MethodSummaries,
    config: TranslateConfig,
}

impl<'a> Translator<'a> {
    pub fn new(summaries: &'a MethodSummaries) -> Self {
        Self::with_config(summaries, TranslateConfig::default())
    }

    pub fn with_config(summaries: &'a MethodSummaries, config: TranslateConfig) -> Self {
        Self { summaries, config }
    }

    pub fn config(&self) -> &TranslateConfig {
        &self.config
    }

    /// Translates one method body.
    ///
    /// Losses of precision are reported to `diagnostics`, also when the
    /// translation fails.
    pub fn translate(&self, body: &Body, diagnostics: &mut impl Diagnostics) -> Result<KoatProblem, Error> {
        debug!("translating {}", body.method);
        let domain = Domain::from_body(body);
        let mut run = Run {
            abstraction: self.config.abstraction.strategy(),
            summaries: self.summaries,
            labels: LabelMaker::new(&body.units),
            fresh: Fresh::new(),
            reports: Vec::new(),
        };
        let result = run.body(body);
        for report in run.reports.drain(..) {
            diagnostics.report(report);
        }
        let transitions = result?;
        debug!("{} yields {} transitions", body.method, transitions.len());

        Ok(KoatProblem::with_fresh(domain, transitions, run.fresh))
    }
}

/// State of one translation run.
struct Run<'a> {
    abstraction: &'static dyn SizeAbstraction,
    summaries: &'a MethodSummaries,
    labels: LabelMaker,
    fresh: Fresh,
    reports: Vec<Diagnostic>,
}

/// The effect of a call site.
struct Call {
    effect: Formula,
    ret: Var,
    lower: AExpr,
    upper: AExpr,
}

impl Run<'_> {
    fn body(&mut self, body: &Body) -> Result<Transitions, Error> {
        let mut transitions = Transitions::new();
        for (index, unit) in body.units.iter().enumerate() {
            let from = self.labels.current(index).clone();
            let next = self.labels.fallthrough(index).clone();
            trace!("{}: {}", from, unit.stmt);
            match &unit.stmt {
                Stmt::Assign { lhs, rhs } => {
                    transitions.push(self.assign(from, lhs, rhs, next)?);
                }
                Stmt::Goto { target } => {
                    let to = self.labels.target(target)?.clone();
                    transitions.push(Transition::unguarded(from, to));
                }
                Stmt::If { cond, target } => {
                    let to = self.labels.target(target)?.clone();
                    transitions.extend(self.branch(from, cond, to, next)?);
                }
                Stmt::Switch { key: _, targets, default } => {
                    let to = self.labels.target(default)?.clone();
                    transitions.push(Transition::unguarded(from.clone(), to));
                    for target in targets {
                        let to = self.labels.target(target)?.clone();
                        transitions.push(Transition::unguarded(from.clone(), to));
                    }
                }
                Stmt::Invoke(invoke) => {
                    let call = self.call(invoke)?;
                    transitions.push(Transition::new(from, call.effect, next).with_cost(call.lower, call.upper));
                }
                Stmt::Return(_) | Stmt::Throw(_) => {}
                Stmt::Identity { .. } | Stmt::Nop | Stmt::EnterMonitor(_) | Stmt::ExitMonitor(_) | Stmt::Breakpoint => {
                    if unit.label.is_some() {
                        transitions.push(Transition::unguarded(from, next));
                    }
                }
            }
        }
        Ok(transitions)
    }

    fn assign(&mut self, from: Label, lhs: &LValue, rhs: &RValue, next: Label) -> Result<Transition, Error> {
        let guard = match lhs {
            LValue::Local(local) => return self.assign_local(from, local, rhs, next),
            LValue::StaticField(field) => {
                let value = self.operand(lhs, rhs)?;
                self.abstraction.put_static_field(field, &value)
            }
            LValue::InstanceField { base, field } => {
                let value = self.operand(lhs, rhs)?;
                self.abstraction.put_instance_field(base, field, &value)
            }
            LValue::ArrayElem { base, .. } => {
                let value = self.operand(lhs, rhs)?;
                self.abstraction.put_array_elem(base, &value)
            }
        };
        Ok(Transition::new(from, guard, next))
    }

    /// The immediate stored to a heap location.
    fn operand(&mut self, lhs: &LValue, rhs: &RValue) -> Result<AExpr, Error> {
        match rhs {
            RValue::Immediate(imm) => Ok(self.immediate(imm)),
            _ => Err(Error::unsupported(format!("{} = {}", lhs, rhs))),
        }
    }

    fn assign_local(&mut self, from: Label, local: &Local, rhs: &RValue, next: Label) -> Result<Transition, Error> {
        let x = Var::post(local.name.clone());
        let guard = match rhs {
            RValue::Immediate(imm) => {
                let value = self.immediate(imm);
                Some(Formula::atom([Constraint::assign(x, value)]))
            }
            RValue::StaticField(field) => self.abstraction.get_static_field(local, field),
            RValue::InstanceField { base, field } => self.abstraction.get_instance_field(local, base, field),
            RValue::ArrayElem { base, .. } => self.abstraction.get_array_elem(local, base),
            RValue::Binary { op, lhs, rhs } => {
                let a = self.immediate(lhs);
                let b = self.immediate(rhs);
                let value = match op {
                    BinOp::Add => Some(a + b),
                    BinOp::Sub => Some(a - b),
                    BinOp::Mul => Some(a * b),
                    _ => None,
                };
                value.map(|v| Formula::atom([Constraint::assign(x, v)]))
            }
            RValue::Cast { op, ty } => {
                if op.ty().narrows_to(ty) {
                    None
                } else {
                    let value = self.immediate(op);
                    Some(Formula::atom([Constraint::assign(x, value)]))
                }
            }
            RValue::InstanceOf { .. } => None,
            RValue::Invoke(invoke) => {
                let call = self.call(invoke)?;
                let guard = call.effect.and([Constraint::assign(x, call.ret)]);
                return Ok(Transition::new(from, guard, next).with_cost(call.lower, call.upper));
            }
            RValue::New(_) => Some(Formula::atom([Constraint::assign(x, AExpr::one())])),
            RValue::NewArray { size, .. } => {
                let n = self.immediate(size);
                Some(Formula::atom([Constraint::assign(x, n)]))
            }
            RValue::NewMultiArray { .. } => None,
            RValue::Length(array) => {
                let a = self.immediate(array);
                Some(Formula::atom([
                    Constraint::assign(x.clone(), a),
                    Constraint::nonnegative(x),
                ]))
            }
            RValue::Neg(op) => {
                let v = self.immediate(op);
                Some(Formula::atom([Constraint::assign(x, AExpr::zero() - v)]))
            }
        };
        let guard = match guard {
            Some(guard) => guard,
            None => self.undefined(&from, local, rhs),
        };
        Ok(Transition::new(from, guard, next))
    }

    /// `x' >= 0` for references, `x' = fresh` otherwise.
    fn undefined(&mut self, from: &Label, local: &Local, rhs: &RValue) -> Formula {
        self.reports.push(Diagnostic::Undefined {
            label: from.clone(),
            reason: format!("{} = {}", local, rhs),
        });
        let x = Var::post(local.name.clone());
        if local.ty.is_reference() {
            Formula::atom([Constraint::nonnegative(x)])
        } else {
            Formula::atom([Constraint::assign(x, self.fresh.var())])
        }
    }

    fn immediate(&mut self, imm: &Immediate) -> AExpr {
        match imm {
            Immediate::Local(local) => AExpr::var(Var::new(local.name.clone())),
            Immediate::Constant(Constant::Null) => AExpr::zero(),
            Immediate::Constant(Constant::Int(v)) => AExpr::val(i64::from(*v)),
            Immediate::Constant(Constant::Long(v)) => AExpr::val(*v),
            Immediate::Constant(Constant::Float(_) | Constant::Str(_) | Constant::Class(_)) => {
                AExpr::var(self.fresh.var())
            }
        }
    }

    fn branch(&mut self, from: Label, cond: &Condition, to: Label, next: Label) -> Result<Vec<Transition>, Error> {
        let (lt, rt) = (cond.lhs.ty(), cond.rhs.ty());
        let a = self.immediate(&cond.lhs);
        let b = self.immediate(&cond.rhs);
        let edge = |guard: Formula, target: &Label| Transition::new(from.clone(), guard, target.clone());
        let atom = |c: Constraint| Formula::atom([c]);

        if lt.is_integral() && rt.is_integral() {
            let edges = match cond.op {
                CondOp::Gt => vec![
                    edge(atom(Constraint::gt(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::le(a, b)), &next),
                ],
                CondOp::Ge => vec![
                    edge(atom(Constraint::ge(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::lt(a, b)), &next),
                ],
                CondOp::Lt => vec![
                    edge(atom(Constraint::lt(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::ge(a, b)), &next),
                ],
                CondOp::Le => vec![
                    edge(atom(Constraint::le(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::gt(a, b)), &next),
                ],
                CondOp::Eq => vec![
                    edge(atom(Constraint::eq(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::gt(a.clone(), b.clone())), &next),
                    edge(atom(Constraint::lt(a, b)), &next),
                ],
                CondOp::Ne => vec![
                    edge(atom(Constraint::gt(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::lt(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::eq(a, b)), &next),
                ],
            };
            return Ok(edges);
        }

        if lt.is_reference() && rt.is_reference() {
            let lhs_null = cond.lhs.is_null();
            let rhs_null = cond.rhs.is_null();
            // sizes: null is 0, everything else is positive
            let edges = match cond.op {
                CondOp::Eq if lhs_null => vec![
                    edge(atom(Constraint::eq(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::lt(a, b)), &next),
                ],
                CondOp::Eq if rhs_null => vec![
                    edge(atom(Constraint::eq(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::gt(a, b)), &next),
                ],
                CondOp::Eq => vec![
                    edge(atom(Constraint::eq(a, b)), &to),
                    edge(Formula::empty(), &next),
                ],
                CondOp::Ne if lhs_null => vec![
                    edge(atom(Constraint::lt(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::eq(a, b)), &next),
                ],
                CondOp::Ne if rhs_null => vec![
                    edge(atom(Constraint::gt(a.clone(), b.clone())), &to),
                    edge(atom(Constraint::eq(a, b)), &next),
                ],
                CondOp::Ne => vec![
                    edge(Formula::empty(), &to),
                    edge(atom(Constraint::eq(a, b)), &next),
                ],
                _ => return Err(Error::unsupported(format!("if {}", cond))),
            };
            return Ok(edges);
        }

        Err(Error::unsupported(format!("if {}", cond)))
    }

    fn resolve(&mut self, invoke: &Invoke) -> MethodSummary {
        let m = &invoke.method;
        if let Some(summary) = self.summaries.get(&m.class, &m.name, &m.descriptor) {
            return summary.clone();
        }
        if let Some(summary) = self.summaries.get_by_name(&m.class, &m.name) {
            self.reports.push(Diagnostic::PrefixSummary {
                class: m.class.clone(),
                method: m.name.clone(),
                descriptor: m.descriptor.clone(),
                used: summary.descriptor.clone(),
            });
            return summary.clone();
        }
        self.reports.push(Diagnostic::DefaultSummary {
            class: m.class.clone(),
            method: m.name.clone(),
            descriptor: m.descriptor.clone(),
        });
        MethodSummary::default()
    }

    /// Instantiates the summary of the callee at this call site.
    fn call(&mut self, invoke: &Invoke) -> Result<Call, Error> {
        if invoke.kind == InvokeKind::Dynamic {
            return Err(Error::unsupported(invoke));
        }
        let summary = self.resolve(invoke);
        let effect = summary.effect(&mut self.fresh);

        let mut map: HashMap<Var, AExpr> = HashMap::new();
        for (i, arg) in invoke.args.iter().enumerate() {
            let placeholder = format!("arg{}", i + 1);
            let after = match arg.as_local() {
                Some(local) => AExpr::var(Var::post(local.name.clone())),
                None => AExpr::var(self.fresh.var()),
            };
            map.insert(Var::post(placeholder.clone()), after);
            map.insert(Var::new(placeholder), self.immediate(arg));
        }
        if let Some(base) = &invoke.base {
            map.insert(Var::new("this"), AExpr::var(Var::new(base.name.clone())));
            map.insert(Var::post("this"), AExpr::var(Var::post(base.name.clone())));
        }
        let ret = self.fresh.ret();
        map.insert(Var::new("ret"), AExpr::var(ret.clone()));

        Ok(Call {
            effect: effect.substitute(&map),
            ret,
            lower: summary.lower_time().substitute(&map),
            upper: summary.upper_time().substitute(&map),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Field, MethodRef, Type, Unit};

    use test_log::test;

    fn int(name: &str) -> Local {
        Local::new(name, Type::Int)
    }

    fn node(name: &str) -> Local {
        Local::new(name, Type::Ref("Node".into()))
    }

    fn body(locals: Vec<Local>, units: Vec<Unit>) -> Body {
        let mut body = Body::new(MethodRef::new("Test", "run", "()V")).with_locals(locals);
        for unit in units {
            body.push(unit);
        }
        body
    }

    fn assign(x: &Local, rhs: RValue) -> Stmt {
        Stmt::Assign {
            lhs: LValue::Local(x.clone()),
            rhs,
        }
    }

    fn guards(problem: &KoatProblem) -> Vec<String> {
        problem.iter().map(|t| t.guard.to_string()).collect()
    }

    fn translate(body: &Body) -> (KoatProblem, Vec<Diagnostic>) {
        let summaries = MethodSummaries::new();
        let mut reports: Vec<Diagnostic> = Vec::new();
        let problem = Translator::new(&summaries).translate(body, &mut reports).unwrap();
        (problem, reports)
    }

    #[test]
    fn test_arithmetic() {
        let i = int("i");
        let j = int("j");
        let b = body(
            vec![i.clone(), j.clone()],
            vec![
                Unit::new(assign(&i, RValue::Immediate(Constant::Int(0).into()))),
                Unit::new(assign(
                    &j,
                    RValue::Binary {
                        op: BinOp::Add,
                        lhs: i.clone().into(),
                        rhs: Constant::Int(-1).into(),
                    },
                )),
                Unit::new(assign(&j, RValue::Neg(i.clone().into()))),
                Unit::new(Stmt::Return(None)),
            ],
        );
        let (problem, reports) = translate(&b);
        assert_eq!(
            guards(&problem),
            vec!["(i' = 0)", "(j' = (i + (-1)))", "(j' = (0 - i))"]
        );
        assert!(reports.is_empty());
    }

    #[test]
    fn test_undefined_values() {
        let i = int("i");
        let r = node("r");
        let b = body(
            vec![i.clone(), r.clone()],
            vec![
                Unit::new(assign(
                    &i,
                    RValue::Binary {
                        op: BinOp::Div,
                        lhs: i.clone().into(),
                        rhs: Constant::Int(2).into(),
                    },
                )),
                Unit::new(assign(
                    &i,
                    RValue::Cast {
                        op: Local::new("l", Type::Long).into(),
                        ty: Type::Int,
                    },
                )),
                Unit::new(assign(
                    &r,
                    RValue::InstanceOf {
                        op: r.clone().into(),
                        ty: Type::Ref("Node".into()),
                    },
                )),
            ],
        );
        let (problem, reports) = translate(&b);
        assert_eq!(
            guards(&problem),
            vec!["(i' = fresh_0)", "(i' = fresh_1)", "(r' >= 0)"]
        );
        assert_eq!(reports.len(), 3);
        assert!(matches!(&reports[0], Diagnostic::Undefined { label, .. } if label.name() == "l0"));
    }

    #[test]
    fn test_objects_and_arrays() {
        let n = int("n");
        let a = Local::new("a", Type::Array(Box::new(Type::Int)));
        let r = node("r");
        let b = body(
            vec![n.clone(), a.clone(), r.clone()],
            vec![
                Unit::new(assign(&r, RValue::New("Node".into()))),
                Unit::new(assign(
                    &a,
                    RValue::NewArray {
                        elem: Type::Int,
                        size: n.clone().into(),
                    },
                )),
                Unit::new(assign(&n, RValue::Length(a.clone().into()))),
                Unit::new(Stmt::Assign {
                    lhs: LValue::ArrayElem {
                        base: a.clone(),
                        index: Constant::Int(0).into(),
                    },
                    rhs: RValue::Immediate(n.clone().into()),
                }),
                Unit::new(Stmt::Assign {
                    lhs: LValue::InstanceField {
                        base: r.clone(),
                        field: Field::new("Node", "next", Type::Ref("Node".into()), false),
                    },
                    rhs: RValue::Immediate(Constant::Null.into()),
                }),
            ],
        );
        let (problem, _) = translate(&b);
        assert_eq!(
            guards(&problem),
            vec![
                "(r' = 1)",
                "(a' = n)",
                "(n' = a && n' >= 0)",
                "(TRUE)",
                "(r' > 0 && r' <= (r + 0))",
            ]
        );
    }

    #[test]
    fn test_store_requires_immediate() {
        let a = Local::new("a", Type::Array(Box::new(Type::Int)));
        let b = body(
            vec![a.clone()],
            vec![Unit::new(Stmt::Assign {
                lhs: LValue::ArrayElem {
                    base: a.clone(),
                    index: Constant::Int(0).into(),
                },
                rhs: RValue::New("Node".into()),
            })],
        );
        let summaries = MethodSummaries::new();
        let err = Translator::new(&summaries).translate(&b, &mut ()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedConstruct { .. }));
    }

    #[test]
    fn test_int_branches() {
        let i = int("i");
        let cond = |op| Stmt::If {
            cond: Condition {
                op,
                lhs: i.clone().into(),
                rhs: Constant::Int(10).into(),
            },
            target: "exit".into(),
        };
        for (op, expected) in [
            (CondOp::Gt, vec!["exit: (i > 10)", "l1: (i <= 10)"]),
            (CondOp::Ge, vec!["exit: (i >= 10)", "l1: (i < 10)"]),
            (CondOp::Lt, vec!["exit: (i < 10)", "l1: (i >= 10)"]),
            (CondOp::Le, vec!["exit: (i <= 10)", "l1: (i > 10)"]),
            (CondOp::Eq, vec!["exit: (i = 10)", "l1: (i > 10)", "l1: (i < 10)"]),
            (CondOp::Ne, vec!["exit: (i > 10)", "exit: (i < 10)", "l1: (i = 10)"]),
        ] {
            let b = body(
                vec![i.clone()],
                vec![
                    Unit::new(cond(op)),
                    Unit::new(Stmt::Return(None)),
                    Unit::labelled("exit", Stmt::Return(None)),
                ],
            );
            let (problem, _) = translate(&b);
            let edges: Vec<String> = problem.iter().map(|t| format!("{}: {}", t.to, t.guard)).collect();
            assert_eq!(edges, expected, "{}", op);
        }
    }

    #[test]
    fn test_ref_branches() {
        let r = node("r");
        let s = node("s");
        let null = || Immediate::from(Constant::Null);
        let cases: Vec<(CondOp, Immediate, Immediate, Vec<&str>)> = vec![
            (CondOp::Eq, null(), r.clone().into(), vec!["exit: (0 = r)", "l1: (0 < r)"]),
            (CondOp::Eq, r.clone().into(), null(), vec!["exit: (r = 0)", "l1: (r > 0)"]),
            (CondOp::Eq, r.clone().into(), s.clone().into(), vec!["exit: (r = s)", "l1: FALSE"]),
            (CondOp::Ne, null(), r.clone().into(), vec!["exit: (0 < r)", "l1: (0 = r)"]),
            (CondOp::Ne, r.clone().into(), null(), vec!["exit: (r > 0)", "l1: (r = 0)"]),
            (CondOp::Ne, r.clone().into(), s.clone().into(), vec!["exit: FALSE", "l1: (r = s)"]),
        ];
        for (op, lhs, rhs, expected) in cases {
            let b = body(
                vec![r.clone(), s.clone()],
                vec![
                    Unit::new(Stmt::If {
                        cond: Condition { op, lhs, rhs },
                        target: "exit".into(),
                    }),
                    Unit::new(Stmt::Return(None)),
                    Unit::labelled("exit", Stmt::Return(None)),
                ],
            );
            let (problem, _) = translate(&b);
            let edges: Vec<String> = problem.iter().map(|t| format!("{}: {}", t.to, t.guard)).collect();
            assert_eq!(edges, expected);
        }
    }

    #[test]
    fn test_unsupported_branches() {
        let summaries = MethodSummaries::new();
        let translator = Translator::new(&summaries);
        let r = node("r");
        let d = Local::new("d", Type::Double);
        for cond in [
            Condition {
                op: CondOp::Lt,
                lhs: r.clone().into(),
                rhs: Constant::Null.into(),
            },
            Condition {
                op: CondOp::Lt,
                lhs: d.clone().into(),
                rhs: d.clone().into(),
            },
        ] {
            let b = body(
                vec![r.clone(), d.clone()],
                vec![Unit::labelled(
                    "exit",
                    Stmt::If {
                        cond,
                        target: "exit".into(),
                    },
                )],
            );
            assert!(matches!(
                translator.translate(&b, &mut ()),
                Err(Error::UnsupportedConstruct { .. })
            ));
        }
    }

    #[test]
    fn test_unknown_jump_target() {
        let b = body(vec![], vec![Unit::new(Stmt::Goto { target: "nowhere".into() })]);
        let summaries = MethodSummaries::new();
        let err = Translator::new(&summaries).translate(&b, &mut ()).unwrap_err();
        assert!(matches!(err, Error::UnreachableLabel { label } if label == "nowhere"));
    }

    #[test]
    fn test_switch_and_silent() {
        let i = int("i");
        let b = body(
            vec![i.clone()],
            vec![
                Unit::new(Stmt::Identity { local: i.clone() }),
                Unit::new(Stmt::Switch {
                    key: i.clone().into(),
                    targets: vec!["a".into(), "b".into()],
                    default: "c".into(),
                }),
                Unit::labelled("a", Stmt::Nop),
                Unit::labelled("b", Stmt::Nop),
                Unit::labelled("c", Stmt::Return(None)),
            ],
        );
        let (problem, _) = translate(&b);
        let edges: Vec<String> = problem.iter().map(|t| format!("{} -> {}", t.from, t.to)).collect();
        assert_eq!(edges, vec!["l0 -> c", "l0 -> a", "l0 -> b", "a -> b", "b -> c"]);
        assert!(problem.iter().all(|t| t.guard.is_identity()));
    }

    #[test]
    fn test_calls() {
        let json = r#"{ "summaries": [ { "class": "List", "methods": [
            { "name": "size", "descriptor": "()I",
              "complexity": { "upperTime": "this" },
              "upperSize": [{ "pos": "ret", "bound": "this" }] },
            { "name": "add", "descriptor": "(Ljava/lang/Object;)Z",
              "lowerSize": [{ "pos": "this", "bound": "this + 1" }] } ] } ] }"#;
        let summaries = MethodSummaries::from_json(json).unwrap();
        let l = Local::new("l", Type::Ref("List".into()));
        let n = int("n");
        let o = Local::new("o", Type::Ref("java.lang.Object".into()));
        let size = Invoke {
            kind: InvokeKind::Virtual,
            method: MethodRef::new("List", "size", "()I"),
            base: Some(l.clone()),
            args: vec![],
        };
        let add = Invoke {
            kind: InvokeKind::Interface,
            method: MethodRef::new("List", "add", "(Ljava/lang/Object;)Z"),
            base: Some(l.clone()),
            args: vec![o.clone().into()],
        };
        let unknown = Invoke {
            kind: InvokeKind::Static,
            method: MethodRef::new("Util", "log", "(I)V"),
            base: None,
            args: vec![n.clone().into()],
        };
        let b = body(
            vec![l.clone(), n.clone(), o.clone()],
            vec![
                Unit::new(assign(&n, RValue::Invoke(size))),
                Unit::new(Stmt::Invoke(add)),
                Unit::new(Stmt::Invoke(unknown)),
            ],
        );
        let mut reports: Vec<Diagnostic> = Vec::new();
        let problem = Translator::new(&summaries).translate(&b, &mut reports).unwrap();
        assert_eq!(
            guards(&problem),
            vec!["(ret_0 <= l && n' = ret_0)", "((l + 1) <= l')", "(TRUE)"]
        );
        let first = problem.transitions().first().unwrap();
        assert_eq!(first.upper, AExpr::var(Var::new("l")));
        assert_eq!(first.lower, AExpr::one());
        assert_eq!(
            reports,
            vec![Diagnostic::DefaultSummary {
                class: "Util".into(),
                method: "log".into(),
                descriptor: "(I)V".into(),
            }]
        );
    }

    #[test]
    fn test_prefix_summary_and_dynamic() {
        let json = r#"{ "summaries": [ { "class": "Math", "methods": [
            { "name": "abs", "descriptor": "(I)I",
              "upperSize": [{ "pos": "ret", "bound": "arg1 * arg1" }] } ] } ] }"#;
        let summaries = MethodSummaries::from_json(json).unwrap();
        let n = int("n");
        let call = |kind| Invoke {
            kind,
            method: MethodRef::new("Math", "abs", "(J)J"),
            base: None,
            args: vec![Constant::Int(3).into()],
        };
        let b = body(vec![n.clone()], vec![Unit::new(assign(&n, RValue::Invoke(call(InvokeKind::Static))))]);
        let mut reports: Vec<Diagnostic> = Vec::new();
        let problem = Translator::new(&summaries).translate(&b, &mut reports).unwrap();
        assert_eq!(guards(&problem), vec!["(ret_0 <= (3 * 3) && n' = ret_0)"]);
        assert!(matches!(&reports[0], Diagnostic::PrefixSummary { used, .. } if used == "(I)I"));

        let b = body(vec![n.clone()], vec![Unit::new(assign(&n, RValue::Invoke(call(InvokeKind::Dynamic))))]);
        assert!(Translator::new(&summaries).translate(&b, &mut ()).is_err());
    }

    #[test]
    fn test_static_fields_and_abstraction() {
        let i = int("i");
        let r = node("r");
        let count = Field::new("Test", "count", Type::Int, true);
        let val = Field::new("Node", "val", Type::Int, false);
        let mut b = body(
            vec![i.clone(), r.clone()],
            vec![
                Unit::new(assign(&i, RValue::StaticField(count.clone()))),
                Unit::new(Stmt::Assign {
                    lhs: LValue::StaticField(count.clone()),
                    rhs: RValue::Immediate(Constant::Int(1).into()),
                }),
                Unit::new(Stmt::Assign {
                    lhs: LValue::InstanceField {
                        base: r.clone(),
                        field: val.clone(),
                    },
                    rhs: RValue::Immediate(i.clone().into()),
                }),
            ],
        );
        b.fields.push(count);
        let summaries = MethodSummaries::new();
        let config = TranslateConfig::default().with_abstraction(Abstraction::SimplePathLength);
        let problem = Translator::with_config(&summaries, config).translate(&b, &mut ()).unwrap();
        assert_eq!(
            guards(&problem),
            vec!["(i' = Test.count)", "(Test.count' = 1)", "(r' > 0 && r' = r)"]
        );
        assert_eq!(problem.domain().len(), 3);
    }
}
