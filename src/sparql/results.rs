//! Serde model of the SPARQL 1.1 Query Results JSON format.
//!
//! <https://www.w3.org/TR/sparql11-results-json/>

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One solution: variable name → bound term. Unbound variables are absent.
pub type Solution = BTreeMap<String, RdfTerm>;

/// A bound RDF term as it appears in a results document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RdfTerm {
    Uri {
        value: String,
    },
    // Virtuoso still emits the SPARQL 1.0 "typed-literal" type.
    #[serde(alias = "typed-literal")]
    Literal {
        value: String,
        #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
    Bnode {
        value: String,
    },
}

impl RdfTerm {
    pub fn uri(value: impl Into<String>) -> Self {
        RdfTerm::Uri {
            value: value.into(),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        RdfTerm::Literal {
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    /// Lexical value, whatever the term kind.
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Uri { value } | RdfTerm::Literal { value, .. } | RdfTerm::Bnode { value } => {
                value
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsBody {
    #[serde(default)]
    pub bindings: Vec<Solution>,
}

/// A full results document (`SELECT` or `ASK`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: ResultsHead,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

impl SparqlResults {
    pub fn from_solutions(vars: Vec<String>, bindings: Vec<Solution>) -> Self {
        Self {
            head: ResultsHead { vars },
            results: Some(ResultsBody { bindings }),
            boolean: None,
        }
    }

    /// Solutions in engine order. A document without a `results` section
    /// (an ASK answer, or an empty object) yields no solutions.
    pub fn into_solutions(self) -> Vec<Solution> {
        self.results.map(|r| r.bindings).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.results.as_ref().map_or(0, |r| r.bindings.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
