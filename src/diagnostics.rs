//! Events reported while translating method bodies.
//!
//! The translator never prints. It hands every loss of precision to a
//! [`Diagnostics`] sink chosen by the caller.

use std::fmt;

use log::{info, warn};

use crate::label::Label;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Diagnostic {
    /// A value was replaced by an unconstrained one.
    Undefined { label: Label, reason: String },
    /// No summary matched a call; the default summary was used.
    DefaultSummary {
        class: String,
        method: String,
        descriptor: String,
    },
    /// A summary of another overload was used.
    PrefixSummary {
        class: String,
        method: String,
        descriptor: String,
        used: String,
    },
    /// A method could not be translated and was skipped.
    UnsupportedConstruct { method: String, construct: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Undefined { label, reason } => {
                write!(f, "{}: undefined value ({})", label, reason)
            }
            Diagnostic::DefaultSummary {
                class,
                method,
                descriptor,
            } => write!(f, "no summary for {}.{}{}, using default", class, method, descriptor),
            Diagnostic::PrefixSummary {
                class,
                method,
                descriptor,
                used,
            } => write!(f, "no summary for {}.{}{}, using {}.{}{}", class, method, descriptor, class, method, used),
            Diagnostic::UnsupportedConstruct { method, construct } => {
                write!(f, "skipping {}: unsupported construct {}", method, construct)
            }
        }
    }
}

pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Discards everything.
impl Diagnostics for () {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Collects everything.
impl Diagnostics for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Forwards to the `log` facade: skipped methods at `warn`, the rest at `info`.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::UnsupportedConstruct { .. } => warn!("{}", diagnostic),
            _ => info!("{}", diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_collect() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        let by_ref = &mut sink;
        by_ref.report(Diagnostic::DefaultSummary {
            class: "Foo".into(),
            method: "bar".into(),
            descriptor: "()V".into(),
        });
        LogDiagnostics.report(sink[0].clone());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].to_string(), "no summary for Foo.bar()V, using default");
    }

    #[test]
    fn test_display_undefined() {
        let d = Diagnostic::Undefined {
            label: Label::synthesized("l3"),
            reason: "i0 / 2".into(),
        };
        assert_eq!(d.to_string(), "l3: undefined value (i0 / 2)");
        ().report(d);
    }
}
