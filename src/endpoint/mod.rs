//! Knowledge-base engines: anything that answers SPARQL with a results document.

pub mod local;
pub mod remote;

pub use local::LocalEndpoint;
pub use remote::RemoteEndpoint;

use crate::error::EndpointResult;
use crate::sparql::{SparqlQuery, SparqlResults};

/// A SPARQL engine the resolver can run queries against.
///
/// Calls block; async callers should move them onto a blocking pool.
pub trait SparqlEndpoint: Send + Sync {
    /// Run a `SELECT` (or `ASK`) query and parse the results document.
    fn select(&self, query: &SparqlQuery) -> EndpointResult<SparqlResults>;

    /// Run arbitrary query text and return the engine's JSON document untouched.
    fn raw(&self, query: &str) -> EndpointResult<serde_json::Value>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

impl<E: SparqlEndpoint + ?Sized> SparqlEndpoint for std::sync::Arc<E> {
    fn select(&self, query: &SparqlQuery) -> EndpointResult<SparqlResults> {
        (**self).select(query)
    }

    fn raw(&self, query: &str) -> EndpointResult<serde_json::Value> {
        (**self).raw(query)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
