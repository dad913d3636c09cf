//! Label filter compiler: "starts with" / "contains" constraints on labels.
//!
//! A [`LabelFilter`] holds the raw request parameters. Compiling it against a
//! label variable yields [`LabelPredicate`]s, which render as SPARQL `FILTER`
//! clauses or evaluate in-process against an already synthesized label.

use std::fmt;

use oxigraph::sparql::Variable;
use serde::{Deserialize, Serialize};

use crate::sparql::string_literal;

/// Optional text constraints taken from a request, exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFilter {
    /// Case-insensitive prefix. `Some("")` is a no-op.
    #[serde(default)]
    pub startswith: Option<String>,
    /// Comma-separated, case-insensitive substrings; all must match.
    #[serde(default)]
    pub contains: Option<String>,
}

/// Which family a predicate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    StartsWith,
    Contains,
}

/// One compiled constraint over a label variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPredicate {
    kind: PredicateKind,
    needle: String,
    label: Variable,
}

impl LabelFilter {
    pub fn new(startswith: Option<&str>, contains: Option<&str>) -> Self {
        Self {
            startswith: startswith.map(str::to_string),
            contains: contains.map(str::to_string),
        }
    }

    /// No constraints at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Both families, ANDed: at most one prefix predicate, then one
    /// predicate per comma-separated `contains` token.
    pub fn compile(&self, label: &Variable) -> Vec<LabelPredicate> {
        let mut predicates = Vec::new();
        if let Some(prefix) = self.startswith.as_deref().filter(|p| !p.is_empty()) {
            predicates.push(LabelPredicate {
                kind: PredicateKind::StartsWith,
                needle: prefix.to_string(),
                label: label.clone(),
            });
        }
        predicates.extend(self.compile_contains(label));
        predicates
    }

    /// Only the "contains" family.
    ///
    /// Splitting keeps empty tokens, so `contains=""` compiles to a single
    /// predicate that every label satisfies.
    pub fn compile_contains(&self, label: &Variable) -> Vec<LabelPredicate> {
        let Some(contains) = self.contains.as_deref() else {
            return Vec::new();
        };
        contains
            .split(',')
            .map(|token| LabelPredicate {
                kind: PredicateKind::Contains,
                needle: token.to_string(),
                label: label.clone(),
            })
            .collect()
    }

    pub fn has_prefix(&self) -> bool {
        self.startswith.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl LabelPredicate {
    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Evaluate against a label value with the same lower-casing the store applies.
    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        let needle = self.needle.to_lowercase();
        match self.kind {
            PredicateKind::StartsWith => label.starts_with(&needle),
            PredicateKind::Contains => label.contains(&needle),
        }
    }
}

/// `FILTER(...)` clause.
impl fmt::Display for LabelPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = match self.kind {
            PredicateKind::StartsWith => "STRSTARTS",
            PredicateKind::Contains => "CONTAINS",
        };
        write!(
            f,
            "FILTER({function}(LCASE(STR({})), LCASE({})))",
            self.label,
            string_literal(&self.needle)
        )
    }
}

/// Render predicates as consecutive `FILTER` lines.
pub(crate) fn render_filters(predicates: &[LabelPredicate], indent: &str) -> String {
    predicates
        .iter()
        .map(|p| format!("{indent}{p}\n"))
        .collect()
}

/// True when every predicate holds for `label`.
pub fn matches_all(predicates: &[LabelPredicate], label: &str) -> bool {
    predicates.iter().all(|p| p.matches(label))
}
