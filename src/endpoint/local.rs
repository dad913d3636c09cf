//! In-memory SPARQL engine backed by oxigraph, loaded from Turtle.

use std::path::Path;

use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use super::SparqlEndpoint;
use crate::error::{EndpointError, EndpointResult};
use crate::sparql::{RdfTerm, Solution, SparqlQuery, SparqlResults};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// oxigraph store answering queries in-process.
pub struct LocalEndpoint {
    store: Store,
    source: String,
}

impl LocalEndpoint {
    /// Create an empty in-memory store.
    pub fn in_memory() -> EndpointResult<Self> {
        let store = Store::new().map_err(|e| EndpointError::Store {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self {
            store,
            source: "memory".into(),
        })
    }

    /// Create a store holding the triples of a Turtle document.
    pub fn from_turtle(data: &str) -> EndpointResult<Self> {
        let endpoint = Self::in_memory()?;
        endpoint.load_turtle(data)?;
        Ok(endpoint)
    }

    /// Create a store from a Turtle file.
    pub fn from_file(path: &Path) -> EndpointResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| EndpointError::Store {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let mut endpoint = Self::from_turtle(&data)?;
        endpoint.source = path.display().to_string();
        Ok(endpoint)
    }

    /// Add the triples of a Turtle document to the default graph.
    pub fn load_turtle(&self, data: &str) -> EndpointResult<()> {
        self.store
            .load_from_reader(RdfFormat::Turtle, data.as_bytes())
            .map_err(|e| EndpointError::Store {
                message: format!("failed to load Turtle: {e}"),
            })
    }

    /// Number of triples in the store.
    pub fn len(&self) -> EndpointResult<usize> {
        self.store.len().map_err(|e| EndpointError::Store {
            message: format!("failed to count triples: {e}"),
        })
    }

    pub fn is_empty(&self) -> EndpointResult<bool> {
        self.len().map(|n| n == 0)
    }

    fn evaluate(&self, query: &str) -> EndpointResult<SparqlResults> {
        let results = self.store.query(query).map_err(|e| EndpointError::Store {
            message: format!("SPARQL query failed: {e}"),
        })?;

        match results {
            QueryResults::Solutions(solutions) => {
                let vars = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();
                let mut bindings = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| EndpointError::Store {
                        message: format!("solution error: {e}"),
                    })?;
                    let row: Solution = solution
                        .iter()
                        .map(|(var, term)| (var.as_str().to_string(), convert_term(term)))
                        .collect();
                    bindings.push(row);
                }
                Ok(SparqlResults::from_solutions(vars, bindings))
            }
            QueryResults::Boolean(b) => Ok(SparqlResults {
                boolean: Some(b),
                ..Default::default()
            }),
            QueryResults::Graph(_) => Err(EndpointError::Store {
                message: "CONSTRUCT/DESCRIBE queries are not supported".into(),
            }),
        }
    }
}

/// Convert an oxigraph term into its results-document form.
#[allow(unreachable_patterns)]
fn convert_term(term: &Term) -> RdfTerm {
    match term {
        Term::NamedNode(node) => RdfTerm::uri(node.as_str()),
        Term::BlankNode(node) => RdfTerm::Bnode {
            value: node.as_str().to_string(),
        },
        Term::Literal(literal) => {
            let datatype = literal.datatype().as_str();
            RdfTerm::Literal {
                value: literal.value().to_string(),
                lang: literal.language().map(str::to_string),
                datatype: (datatype != XSD_STRING && datatype != RDF_LANG_STRING)
                    .then(|| datatype.to_string()),
            }
        }
        other => RdfTerm::literal(other.to_string()),
    }
}

impl SparqlEndpoint for LocalEndpoint {
    fn select(&self, query: &SparqlQuery) -> EndpointResult<SparqlResults> {
        tracing::debug!(source = %self.source, query = %query, "local SPARQL select");
        self.evaluate(query.as_str())
    }

    fn raw(&self, query: &str) -> EndpointResult<serde_json::Value> {
        let results = self.evaluate(query)?;
        serde_json::to_value(results).map_err(|e| EndpointError::Malformed {
            message: format!("failed to serialize results: {e}"),
        })
    }

    fn describe(&self) -> String {
        format!("local {}", self.source)
    }
}

impl std::fmt::Debug for LocalEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEndpoint")
            .field("source", &self.source)
            .finish()
    }
}
