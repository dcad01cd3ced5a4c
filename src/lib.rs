//! # its-rs: Integer Transition Systems from method bodies
//!
//! **`its-rs`** translates the body of a method, given as typed three-address statements, into an
//! **Integer Transition System** (ITS) and hands it to the KoAT complexity analyser.
//!
//! ## How does it work?
//!
//! Every local of the method (and every tracked static field of its class) becomes an integer
//! observable. Integer values are kept as they are, while references are abstracted to the *size* of
//! the structure they point to. Each statement then becomes a set of guarded edges between control
//! points, whose guards relate the values before (`x`) and after (`x'`) the statement.
//! Calls are not analysed; their effect comes from declarative [method summaries][crate::summary].
//!
//! ## Basic Usage
//!
//! ```rust
//! use its_rs::ir::{BinOp, Body, CondOp, Condition, Constant, LValue, Local, MethodRef, RValue, Stmt, Type, Unit};
//! use its_rs::summary::MethodSummaries;
//! use its_rs::translate::Translator;
//!
//! // for (i = 0; i < n; i++) {}
//! let i = Local::new("i", Type::Int);
//! let n = Local::new("n", Type::Int);
//! let mut body = Body::new(MethodRef::new("Loop", "count", "(I)V")).with_locals([i.clone(), n.clone()]);
//! body.push(Unit::new(Stmt::Assign {
//!     lhs: LValue::Local(i.clone()),
//!     rhs: RValue::Immediate(Constant::Int(0).into()),
//! }));
//! body.push(Unit::labelled("head", Stmt::If {
//!     cond: Condition { op: CondOp::Ge, lhs: i.clone().into(), rhs: n.clone().into() },
//!     target: "exit".into(),
//! }));
//! body.push(Unit::new(Stmt::Assign {
//!     lhs: LValue::Local(i.clone()),
//!     rhs: RValue::Binary { op: BinOp::Add, lhs: i.clone().into(), rhs: Constant::Int(1).into() },
//! }));
//! body.push(Unit::new(Stmt::Goto { target: "head".into() }));
//! body.push(Unit::labelled("exit", Stmt::Return(None)));
//!
//! let summaries = MethodSummaries::default();
//! let problem = Translator::new(&summaries).translate(&body, &mut ())?;
//! assert_eq!(
//!     problem.compact().to_string(),
//!     "(GOAL COMPLEXITY)
//! (STARTTERM (FUNCTIONSYMBOLS l0))
//! (VAR )
//! (RULES
//! l0(i, n) -> head(i', n) :|: i' = 0
//! head(i, n) -> exit(i, n) :|: i >= n
//! head(i, n) -> head(i', n) :|: i < n && i' = (i + 1)
//! )
//! "
//! );
//! # Ok::<(), its_rs::Error>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`formula`]**: guards in disjunctive normal form and their sequential composition.
//! - **[`translate`]**: the statement translator.
//! - **[`transition`]**: the transition graph and its compaction.
//! - **[`koat`]** and **[`executor`]**: the solver input format and the solver process.
//! - **[`driver`]**: translation and analysis of whole programs.

pub mod aexpr;
pub mod constraint;
pub mod diagnostics;
pub mod domain;
pub mod driver;
pub mod error;
pub mod executor;
pub mod formula;
pub mod fresh;
pub mod ir;
pub mod koat;
pub mod label;
pub mod size;
pub mod summary;
pub mod transition;
pub mod translate;
pub mod types;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
