//! Rich diagnostic error types for hacid-kg.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so operators know exactly what went wrong
//! and how to fix it. The HTTP layer maps them onto status codes via
//! [`KgError::is_client_error`] and [`KgError::is_unavailable`].

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for hacid-kg.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum KgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Endpoint(#[from] EndpointError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),
}

impl KgError {
    /// Whether the caller supplied bad input (no query was attempted).
    pub fn is_client_error(&self) -> bool {
        matches!(self, KgError::Resolve(_))
    }

    /// Whether the knowledge-base engine could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, KgError::Endpoint(EndpointError::Unreachable { .. }))
    }
}

// ---------------------------------------------------------------------------
// Resolution (input) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("missing identifier: `{param}` must be a non-empty IRI")]
    #[diagnostic(
        code(hacid::resolve::empty_identifier),
        help("Pass the role or entity-type IRI, e.g. `{param}=https://w3id.org/hacid/...`.")
    )]
    EmptyIdentifier { param: String },

    #[error("invalid IRI \"{iri}\": {message}")]
    #[diagnostic(
        code(hacid::resolve::invalid_iri),
        help(
            "Identifiers are placed into query text and must be absolute IRIs \
             without spaces, angle brackets or quotes."
        )
    )]
    InvalidIri { iri: String, message: String },

    #[error("invalid output variable \"{name}\": {message}")]
    #[diagnostic(
        code(hacid::resolve::invalid_variable),
        help(
            "Output variables must be valid SPARQL variable names, distinct from each \
             other and from the builder's internal variables."
        )
    )]
    InvalidVariable { name: String, message: String },
}

// ---------------------------------------------------------------------------
// Knowledge-base endpoint errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EndpointError {
    #[error("SPARQL endpoint {url} unreachable after {attempts} attempt(s): {message}")]
    #[diagnostic(
        code(hacid::endpoint::unreachable),
        help(
            "Check that the endpoint URL is correct and the store is running. \
             Raise `endpoint.timeout_secs` or `endpoint.max_retries` for slow stores."
        )
    )]
    Unreachable {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("SPARQL endpoint {url} answered HTTP {status}: {body}")]
    #[diagnostic(
        code(hacid::endpoint::status),
        help("The store rejected the query. Inspect it with `hacid-kg explain`.")
    )]
    Status { url: String, status: u16, body: String },

    #[error("malformed SPARQL results: {message}")]
    #[diagnostic(
        code(hacid::endpoint::malformed),
        help("The store must answer with application/sparql-results+json.")
    )]
    Malformed { message: String },

    #[error("local store error: {message}")]
    #[diagnostic(
        code(hacid::endpoint::store),
        help(
            "The in-memory oxigraph store failed. Check the Turtle data file \
             and the query syntax."
        )
    )]
    Store { message: String },
}

impl EndpointError {
    /// Connectivity failures are worth retrying; everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            EndpointError::Unreachable { .. } => true,
            EndpointError::Status { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(hacid::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(hacid::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("invalid value for {key}: {message}")]
    #[diagnostic(
        code(hacid::config::invalid),
        help("Fix the value in the config file or the matching HACID_KG_* variable.")
    )]
    Invalid { key: String, message: String },
}

// ---------------------------------------------------------------------------
// Task catalog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("failed to read task catalog: {path}")]
    #[diagnostic(
        code(hacid::catalog::read),
        help("Set `server.tasks_file` (or HACID_KG_TASKS_FILE) to an existing JSON file.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse task catalog {path}: {message}")]
    #[diagnostic(
        code(hacid::catalog::parse),
        help("The catalog must be a JSON array of task objects with `children`.")
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for functions returning hacid-kg results.
pub type KgResult<T> = std::result::Result<T, KgError>;

/// Endpoint-level result alias.
pub type EndpointResult<T> = std::result::Result<T, EndpointError>;
