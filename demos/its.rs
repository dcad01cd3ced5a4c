use std::path::PathBuf;

use clap::Parser;
use log::info;

use its_rs::diagnostics::LogDiagnostics;
use its_rs::driver::{analyze_program, translate_program};
use its_rs::executor::{ExecutorConfig, KoatExecutor};
use its_rs::ir::*;
use its_rs::size::Abstraction;
use its_rs::summary::MethodSummaries;
use its_rs::translate::TranslateConfig;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Only translate methods whose name contains this string.
    #[arg(value_name = "METHOD")]
    filter: Option<String>,

    /// Method summaries (JSON).
    #[clap(long, value_name = "FILE")]
    summaries: Option<PathBuf>,

    /// Size abstraction: `node-fields` or `path-length`.
    #[clap(long, value_name = "NAME", default_value = "node-fields")]
    abstraction: Abstraction,

    /// Also print the compacted problem.
    #[clap(long)]
    compact: bool,

    /// Run KoAT on the problems.
    #[clap(long)]
    run: bool,

    /// KoAT executable.
    #[clap(long, value_name = "PATH", default_value = "koat")]
    koat: PathBuf,

    /// KoAT timeout (in seconds).
    #[clap(long, value_name = "INT", default_value = "30")]
    timeout: u64,
}

fn int(name: &str) -> Local {
    Local::new(name, Type::Int)
}

fn assign(x: &Local, rhs: RValue) -> Stmt {
    Stmt::Assign {
        lhs: LValue::Local(x.clone()),
        rhs,
    }
}

fn add(x: &Local, y: impl Into<Immediate>) -> RValue {
    RValue::Binary {
        op: BinOp::Add,
        lhs: x.clone().into(),
        rhs: y.into(),
    }
}

fn list_add(list: &Local, value: &Local) -> Stmt {
    Stmt::Invoke(Invoke {
        kind: InvokeKind::Interface,
        method: MethodRef::new("java.util.List", "add", "(Ljava/lang/Object;)Z"),
        base: Some(list.clone()),
        args: vec![value.clone().into()],
    })
}

/// ```java
/// static void simpleLoop(List<Integer> list, int m, int n) {
///     list.add(m);
///     list.add(n);
///     int bound = m + n;
///     int j = 0;
///     for (int i = 0; i < bound; i++) { j += i; list.add(i); }
/// }
/// ```
fn simple_loop() -> Body {
    let list = Local::new("r0", Type::Ref("java.util.List".into()));
    let (m, n, bound, i, j) = (int("i0"), int("i1"), int("i2"), int("i3"), int("i4"));
    let mut body = Body::new(MethodRef::new("Loop", "simpleLoop", "(Ljava/util/List;II)V"))
        .with_locals([list.clone(), m.clone(), n.clone(), bound.clone(), i.clone(), j.clone()])
        .with_fields([Field::new("Loop", "Max", Type::Int, true)]);
    body.push(Unit::new(Stmt::Identity { local: list.clone() }));
    body.push(Unit::new(Stmt::Identity { local: m.clone() }));
    body.push(Unit::new(Stmt::Identity { local: n.clone() }));
    body.push(Unit::new(list_add(&list, &m)));
    body.push(Unit::new(list_add(&list, &n)));
    body.push(Unit::new(assign(&bound, add(&m, n.clone()))));
    body.push(Unit::new(assign(&j, RValue::Immediate(Constant::Int(0).into()))));
    body.push(Unit::new(assign(&i, RValue::Immediate(Constant::Int(0).into()))));
    body.push(Unit::labelled(
        "label1",
        Stmt::If {
            cond: Condition {
                op: CondOp::Ge,
                lhs: i.clone().into(),
                rhs: bound.clone().into(),
            },
            target: "label2".into(),
        },
    ));
    body.push(Unit::new(assign(&j, add(&j, i.clone()))));
    body.push(Unit::new(list_add(&list, &i)));
    body.push(Unit::new(assign(&i, add(&i, Constant::Int(1)))));
    body.push(Unit::new(Stmt::Goto { target: "label1".into() }));
    body.push(Unit::labelled("label2", Stmt::Return(None)));
    body
}

/// ```java
/// static int length(Node node) {
///     int n = 0;
///     while (node != null) { node = node.next; n++; }
///     return n;
/// }
/// ```
fn list_length() -> Body {
    let node = Local::new("r0", Type::Ref("Node".into()));
    let n = int("i0");
    let next = Field::new("Node", "next", Type::Ref("Node".into()), false);
    let mut body =
        Body::new(MethodRef::new("List", "length", "(LNode;)I")).with_locals([node.clone(), n.clone()]);
    body.push(Unit::new(Stmt::Identity { local: node.clone() }));
    body.push(Unit::new(assign(&n, RValue::Immediate(Constant::Int(0).into()))));
    body.push(Unit::labelled(
        "label1",
        Stmt::If {
            cond: Condition {
                op: CondOp::Eq,
                lhs: node.clone().into(),
                rhs: Constant::Null.into(),
            },
            target: "label2".into(),
        },
    ));
    body.push(Unit::new(assign(
        &node,
        RValue::InstanceField {
            base: node.clone(),
            field: next,
        },
    )));
    body.push(Unit::new(assign(&n, add(&n, Constant::Int(1)))));
    body.push(Unit::new(Stmt::Goto { target: "label1".into() }));
    body.push(Unit::labelled("label2", Stmt::Return(Some(n.clone().into()))));
    body
}

/// ```java
/// static void staticMax() {
///     int i = Max;
///     while (i-- >= 0);
/// }
/// ```
fn static_max() -> Body {
    let max = Field::new("Loop", "Max", Type::Int, true);
    let (i, t) = (int("i0"), int("i1"));
    let mut body = Body::new(MethodRef::new("Loop", "staticMax", "()V"))
        .with_locals([i.clone(), t.clone()])
        .with_fields([max.clone()]);
    body.push(Unit::new(assign(&i, RValue::StaticField(max))));
    body.push(Unit::labelled("label1", assign(&t, RValue::Immediate(i.clone().into()))));
    body.push(Unit::new(assign(&i, add(&i, Constant::Int(-1)))));
    body.push(Unit::new(Stmt::If {
        cond: Condition {
            op: CondOp::Ge,
            lhs: t.clone().into(),
            rhs: Constant::Int(0).into(),
        },
        target: "label1".into(),
    }));
    body.push(Unit::new(Stmt::Return(None)));
    body
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    info!("args = {:?}", args);

    let summaries = match &args.summaries {
        Some(path) => MethodSummaries::from_path(path)?,
        None => MethodSummaries::default(),
    };
    info!("loaded {} method summaries", summaries.len());

    let bodies: Vec<Body> = [simple_loop(), list_length(), static_max()]
        .into_iter()
        .filter(|b| match &args.filter {
            Some(filter) => b.method.name.contains(filter.as_str()),
            None => true,
        })
        .collect();

    let config = TranslateConfig::default()
        .with_abstraction(args.abstraction)
        .with_compact(args.compact);
    let reports = if args.run {
        let executor = KoatExecutor::new(
            ExecutorConfig::default()
                .with_binary(&args.koat)
                .with_timeout(args.timeout),
        );
        analyze_program(&bodies, &summaries, config, &executor, &mut LogDiagnostics)?
    } else {
        translate_program(&bodies, &summaries, config, &mut LogDiagnostics)?
    };

    for (body, report) in bodies.iter().zip(reports.iter()) {
        println!("*** {}", report.method);
        println!("{}", body);
        let translation = match &report.result {
            Ok(translation) => translation,
            Err(e) => {
                println!("skipped: {}", e);
                continue;
            }
        };
        println!("*** Its");
        print!("{}", translation.problem);
        if let Some(verdict) = &translation.verdict {
            println!("{}", verdict);
        }
        if let Some(compacted) = &translation.compacted {
            println!("*** Its (compact)");
            print!("{}", compacted);
            if let Some(verdict) = &translation.compacted_verdict {
                println!("{}", verdict);
            }
        }
        println!("---");
    }

    Ok(())
}
