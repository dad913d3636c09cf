//! SPARQL query text and the terms spliced into it.
//!
//! Nothing caller-supplied reaches query text as a raw string: IRIs go
//! through [`NamedNode`] (validated against RFC 3987), string values through
//! [`Literal`] (escaped), and variable names through [`Variable`].

pub mod results;

use oxigraph::model::{Literal, NamedNode};
use oxigraph::sparql::Variable;

use crate::error::ResolveError;

pub use results::{RdfTerm, Solution, SparqlResults};

/// A complete query, ready to hand to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }
}

impl std::fmt::Display for SparqlQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.query)
    }
}

/// Parse a caller-supplied identifier into an IRI safe to embed as `<...>`.
pub fn parse_iri(raw: &str) -> Result<NamedNode, ResolveError> {
    NamedNode::new(raw).map_err(|e| ResolveError::InvalidIri {
        iri: raw.to_string(),
        message: e.to_string(),
    })
}

/// Render a string as an escaped SPARQL string literal (`"..."`).
pub fn string_literal(value: &str) -> String {
    Literal::new_simple_literal(value).to_string()
}

/// Parse a variable name (without the leading `?`).
pub fn parse_variable(name: &str) -> Result<Variable, ResolveError> {
    Variable::new(name).map_err(|e| ResolveError::InvalidVariable {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// The pair of variables a resolution query binds its results to.
///
/// The label variable is what the label filters constrain; callers choose
/// names so the same query shape can serve differently named responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputVars {
    id: Variable,
    label: Variable,
}

impl OutputVars {
    pub fn new(id: &str, label: &str) -> Result<Self, ResolveError> {
        let id = parse_variable(id)?;
        let label = parse_variable(label)?;
        if id == label {
            return Err(ResolveError::InvalidVariable {
                name: label.as_str().to_string(),
                message: "identifier and label variables must differ".into(),
            });
        }
        Ok(Self { id, label })
    }

    /// `?classInstance` / `?classInstanceLabel`.
    pub fn class_instance() -> Self {
        Self {
            id: Variable::new_unchecked("classInstance"),
            label: Variable::new_unchecked("classInstanceLabel"),
        }
    }

    /// `?hazard` / `?hazardLabel`.
    pub fn hazard() -> Self {
        Self {
            id: Variable::new_unchecked("hazard"),
            label: Variable::new_unchecked("hazardLabel"),
        }
    }

    pub fn id(&self) -> &Variable {
        &self.id
    }

    pub fn label(&self) -> &Variable {
        &self.label
    }

    /// Reject output names that would capture one of a builder's own variables.
    pub(crate) fn ensure_disjoint(&self, internal: &[&str]) -> Result<(), ResolveError> {
        for var in [&self.id, &self.label] {
            if internal.contains(&var.as_str()) {
                return Err(ResolveError::InvalidVariable {
                    name: var.as_str().to_string(),
                    message: "name is reserved by the query builder".into(),
                });
            }
        }
        Ok(())
    }
}

impl Default for OutputVars {
    fn default() -> Self {
        Self::class_instance()
    }
}

/// Restrict `label` to the given language tags (`FILTER(lang(..) = ..)`).
pub(crate) fn language_filter(label: &Variable, languages: &[String]) -> Option<String> {
    if languages.is_empty() {
        return None;
    }
    let alternatives = languages
        .iter()
        .map(|tag| format!("lang({label}) = {}", string_literal(&tag.to_lowercase())))
        .collect::<Vec<_>>()
        .join(" || ");
    Some(format!("FILTER({alternatives})"))
}
