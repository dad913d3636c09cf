// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # hacid-kg
//!
//! Role-to-resource resolution over the HACID climate-service knowledge graph.
//! Given a workflow role (or entity type), find the concrete individuals that
//! may fill it, without the client writing SPARQL.
//!
//! ## Architecture
//!
//! - **Resolution** (`resolve`): label filters, type-expansion and
//!   method-hierarchy query builders, the dispatcher and the result normalizer
//! - **SPARQL** (`sparql`): validated term rendering and the JSON results model
//! - **Endpoints** (`endpoint`): remote SPARQL protocol client (ureq) and an
//!   in-memory oxigraph store
//! - **Browse** (`browse`): class and instance listings
//! - **Tasks** (`tasks`): static workflow task catalog
//! - **Server** (`server`, feature `server`): axum HTTP API
//!
//! ## Library usage
//!
//! ```no_run
//! use hacid_kg::config::ServiceConfig;
//! use hacid_kg::endpoint::RemoteEndpoint;
//! use hacid_kg::resolve::{LabelFilter, Resolver};
//!
//! let config = ServiceConfig::default();
//! let endpoint = RemoteEndpoint::new(&config.endpoint);
//! let resolver = Resolver::new(&config.resolution).unwrap();
//! let role = "https://w3id.org/hacid/data/cs/wf/ops/FilterClimateProjectionsByVariable/roles/SelectedVariable";
//! let found = resolver
//!     .resolve(&endpoint, role, &LabelFilter::new(None, Some("temperature")))
//!     .unwrap();
//! for c in &found.candidates {
//!     println!("{} {}", c.id, c.label);
//! }
//! ```

pub mod browse;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod resolve;
#[cfg(feature = "server")]
pub mod server;
pub mod sparql;
pub mod tasks;
pub mod vocab;
