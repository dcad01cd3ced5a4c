//! Whole-program translation and analysis.
//!
//! Methods are translated independently. A method with an unsupported
//! construct is reported and skipped; the other methods are unaffected.
//! Any other error, such as a jump to an unknown label, stops the run.

use log::{error, info};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Error;
use crate::executor::KoatExecutor;
use crate::ir::{Body, MethodRef};
use crate::koat::KoatProblem;
use crate::summary::MethodSummaries;
use crate::translate::{TranslateConfig, Translator};

/// The translation of one method, and the solver verdicts if it was analysed.
#[derive(Debug, Clone)]
pub struct Translation {
    pub problem: KoatProblem,
    /// Present if compaction was requested.
    pub compacted: Option<KoatProblem>,
    pub verdict: Option<String>,
    pub compacted_verdict: Option<String>,
}

#[derive(Debug)]
pub struct MethodReport {
    pub method: MethodRef,
    pub result: Result<Translation, Error>,
}

impl MethodReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn translation(&self) -> Option<&Translation> {
        self.result.as_ref().ok()
    }
}

/// Translates every body, compacting if `config.compact` is set.
pub fn translate_program<'b>(
    bodies: impl IntoIterator<Item = &'b Body>,
    summaries: &MethodSummaries,
    config: TranslateConfig,
    diagnostics: &mut impl Diagnostics,
) -> Result<Vec<MethodReport>, Error> {
    let translator = Translator::with_config(summaries, config);
    let mut reports = Vec::new();
    for body in bodies {
        let result = match translator.translate(body, diagnostics) {
            Ok(problem) => {
                info!("{}: {} transitions", body.method, problem.len());
                let compacted = config.compact.then(|| problem.compact());
                Ok(Translation {
                    problem,
                    compacted,
                    verdict: None,
                    compacted_verdict: None,
                })
            }
            Err(e) if e.is_method_local() => {
                diagnostics.report(Diagnostic::UnsupportedConstruct {
                    method: body.method.to_string(),
                    construct: e.to_string(),
                });
                Err(e)
            }
            Err(e) => {
                error!("{}: {}", body.method, e);
                return Err(e);
            }
        };
        reports.push(MethodReport {
            method: body.method.clone(),
            result,
        });
    }
    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    info!("translated {} methods, {} skipped", reports.len() - failed, failed);
    Ok(reports)
}

/// Translates every body and runs the solver on each problem, plain and
/// compacted.
pub fn analyze_program<'b>(
    bodies: impl IntoIterator<Item = &'b Body>,
    summaries: &MethodSummaries,
    config: TranslateConfig,
    executor: &KoatExecutor,
    diagnostics: &mut impl Diagnostics,
) -> Result<Vec<MethodReport>, Error> {
    let mut reports = translate_program(bodies, summaries, config, diagnostics)?;
    for report in reports.iter_mut() {
        if let Ok(t) = &mut report.result {
            let verdict = executor.execute(&t.problem);
            info!("{}: {}", report.method, verdict);
            t.verdict = Some(verdict);
            if let Some(compacted) = &t.compacted {
                let verdict = executor.execute(compacted);
                info!("{} (compact): {}", report.method, verdict);
                t.compacted_verdict = Some(verdict);
            }
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutorConfig, MAYBE};
    use crate::ir::{Invoke, InvokeKind, Stmt, Unit};

    use test_log::test;

    fn good() -> Body {
        let mut good = Body::new(MethodRef::new("A", "good", "()V"));
        good.push(Unit::new(Stmt::Nop));
        good.push(Unit::labelled("loop", Stmt::Goto { target: "loop".into() }));
        good
    }

    fn unsupported() -> Body {
        let mut body = Body::new(MethodRef::new("A", "dynamic", "()V"));
        body.push(Unit::new(Stmt::Invoke(Invoke {
            kind: InvokeKind::Dynamic,
            method: MethodRef::new("A", "lambda", "()V"),
            base: None,
            args: vec![],
        })));
        body
    }

    fn malformed() -> Body {
        let mut body = Body::new(MethodRef::new("A", "bad", "()V"));
        body.push(Unit::new(Stmt::Goto { target: "missing".into() }));
        body
    }

    #[test]
    fn test_unsupported_is_isolated() {
        let summaries = MethodSummaries::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let bodies = [unsupported(), good()];
        let reports = translate_program(&bodies, &summaries, TranslateConfig::default(), &mut sink).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0].result, Err(Error::UnsupportedConstruct { .. })));
        let good = reports[1].translation().unwrap();
        assert_eq!(good.problem.len(), 1);
        assert!(good.compacted.is_none());
        assert!(matches!(&sink[..], [Diagnostic::UnsupportedConstruct { method, .. }] if method == "A.dynamic()V"));
    }

    #[test]
    fn test_unknown_label_is_fatal() {
        let summaries = MethodSummaries::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let bodies = [good(), malformed(), unsupported()];
        let result = translate_program(&bodies, &summaries, TranslateConfig::default(), &mut sink);
        assert!(matches!(result, Err(Error::UnreachableLabel { ref label }) if label == "missing"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_analyze_without_solver() {
        let summaries = MethodSummaries::new();
        let executor = KoatExecutor::new(ExecutorConfig::default().with_binary("/nonexistent/koat"));
        let config = TranslateConfig::default().with_compact(true);
        let bodies = [unsupported(), good()];
        let reports = analyze_program(&bodies, &summaries, config, &executor, &mut ()).unwrap();
        let good = reports[1].translation().unwrap();
        assert_eq!(good.verdict.as_deref(), Some(MAYBE));
        assert_eq!(good.compacted_verdict.as_deref(), Some(MAYBE));
        assert!(reports[0].translation().is_none());

        let bodies = [malformed()];
        assert!(analyze_program(&bodies, &summaries, config, &executor, &mut ()).is_err());
    }
}
