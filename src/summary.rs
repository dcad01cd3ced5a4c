//! Method summaries: declarative effects of methods that are not analysed.
//!
//! A summary talks about the positions of a call through placeholders:
//! `this` is the receiver, `arg1` to `argN` are the arguments and `ret` is the
//! result. Size bounds are expressions over the pre-values of `this` and the
//! arguments. Summaries are read from JSON:
//!
//! ```json
//! { "summaries": [
//!     { "class": "java.util.ArrayList",
//!       "methods": [
//!         { "name": "size", "descriptor": "()I", "static": false,
//!           "complexity": { "upperTime": "1" },
//!           "upperSize": [{ "pos": "ret", "bound": "this" }] } ] } ] }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::aexpr::AExpr;
use crate::constraint::Constraint;
use crate::error::Error;
use crate::formula::Formula;
use crate::fresh::Fresh;
use crate::types::Var;

/// Time and space bounds of a method; absent bounds are unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Complexity {
    pub lower_time: Option<AExpr>,
    pub upper_time: Option<AExpr>,
    pub lower_space: Option<AExpr>,
    pub upper_space: Option<AExpr>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodSummary {
    pub name: String,
    pub descriptor: String,
    pub is_static: bool,
    pub complexity: Complexity,
    /// `bound <= position` after the call.
    pub lower_size: Vec<(String, AExpr)>,
    /// `position <= bound` after the call.
    pub upper_size: Vec<(String, AExpr)>,
    /// Positions that take an arbitrary value.
    pub modifies: Vec<String>,
}

impl MethodSummary {
    /// The observable of a position: `ret` before the call binds it, the
    /// receiver and arguments after the call.
    pub fn position(pos: &str) -> Var {
        if pos == "ret" {
            Var::new(pos)
        } else {
            Var::post(pos)
        }
    }

    pub fn lower_time(&self) -> AExpr {
        self.complexity.lower_time.clone().unwrap_or_else(AExpr::one)
    }

    pub fn upper_time(&self) -> AExpr {
        self.complexity.upper_time.clone().unwrap_or_else(AExpr::one)
    }

    /// The effect of a call over the placeholders.
    ///
    /// One clause with the size bounds and an unconstrained fresh value for
    /// every modified position; the identity if the summary declares nothing.
    pub fn effect(&self, fresh: &mut Fresh) -> Formula {
        let mut constraints = Vec::new();
        for (pos, bound) in self.lower_size.iter() {
            constraints.push(Constraint::le(bound.clone(), MethodSummary::position(pos)));
        }
        for (pos, bound) in self.upper_size.iter() {
            constraints.push(Constraint::le(MethodSummary::position(pos), bound.clone()));
        }
        for pos in self.modifies.iter() {
            constraints.push(Constraint::assign(MethodSummary::position(pos), fresh.var()));
        }
        Formula::atom(constraints)
    }
}

/// Summaries keyed by `(class, method, descriptor)`.
#[derive(Debug, Clone, Default)]
pub struct MethodSummaries {
    summaries: BTreeMap<(String, String, String), MethodSummary>,
}

impl MethodSummaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: impl Into<String>, summary: MethodSummary) {
        let key = (class.into(), summary.name.clone(), summary.descriptor.clone());
        self.summaries.insert(key, summary);
    }

    /// The summary of exactly this signature.
    pub fn get(&self, class: &str, method: &str, descriptor: &str) -> Option<&MethodSummary> {
        self.summaries
            .get(&(class.to_string(), method.to_string(), descriptor.to_string()))
    }

    /// The summary with the smallest descriptor among the overloads of
    /// `class.method`.
    pub fn get_by_name(&self, class: &str, method: &str) -> Option<&MethodSummary> {
        let start = (class.to_string(), method.to_string(), String::new());
        self.summaries
            .range(start..)
            .next()
            .filter(|((c, m, _), _)| c == class && m == method)
            .map(|(_, summary)| summary)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Iterates `(class, summary)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MethodSummary)> {
        self.summaries.iter().map(|((class, _, _), s)| (class.as_str(), s))
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let file: SummaryFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, Error> {
        let file: SummaryFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("loading method summaries from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_file(file: SummaryFile) -> Result<Self, Error> {
        let mut summaries = MethodSummaries::new();
        for class in file.summaries {
            for method in class.methods {
                let summary = method.into_summary()?;
                debug!("summary for {}.{}{}", class.class, summary.name, summary.descriptor);
                summaries.insert(class.class.clone(), summary);
            }
        }
        Ok(summaries)
    }
}

#[derive(Debug, Deserialize)]
struct SummaryFile {
    summaries: Vec<ClassEntry>,
}

#[derive(Debug, Deserialize)]
struct ClassEntry {
    class: String,
    #[serde(default)]
    methods: Vec<MethodEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MethodEntry {
    name: String,
    #[serde(default)]
    descriptor: String,
    #[serde(rename = "static", default)]
    is_static: bool,
    #[serde(default)]
    complexity: ComplexityEntry,
    #[serde(default)]
    lower_size: Vec<BoundEntry>,
    #[serde(default)]
    upper_size: Vec<BoundEntry>,
    #[serde(default)]
    modifies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComplexityEntry {
    lower_time: Option<String>,
    upper_time: Option<String>,
    lower_space: Option<String>,
    upper_space: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoundEntry {
    pos: String,
    bound: String,
}

fn parse_opt(s: Option<String>) -> Result<Option<AExpr>, Error> {
    s.map(|s| AExpr::parse(&s)).transpose().map_err(Error::from)
}

fn parse_bounds(bounds: Vec<BoundEntry>) -> Result<Vec<(String, AExpr)>, Error> {
    bounds
        .into_iter()
        .map(|b| Ok((b.pos, AExpr::parse(&b.bound)?)))
        .collect()
}

impl MethodEntry {
    fn into_summary(self) -> Result<MethodSummary, Error> {
        let complexity = Complexity {
            lower_time: parse_opt(self.complexity.lower_time)?,
            upper_time: parse_opt(self.complexity.upper_time)?,
            lower_space: parse_opt(self.complexity.lower_space)?,
            upper_space: parse_opt(self.complexity.upper_space)?,
        };
        Ok(MethodSummary {
            name: self.name,
            descriptor: self.descriptor,
            is_static: self.is_static,
            complexity,
            lower_size: parse_bounds(self.lower_size)?,
            upper_size: parse_bounds(self.upper_size)?,
            modifies: self.modifies,
        })
    }
}
