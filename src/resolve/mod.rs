//! Role-to-resource resolution.
//!
//! A [`Resolver`] turns a role (or entity-type) identifier plus optional
//! label filters into a [`ResolutionPlan`]: either a type expansion over the
//! role's expected-type expression, or a walk of the method hierarchy when
//! the identifier is the method sentinel. Executing a plan against a
//! [`SparqlEndpoint`] yields ordered [`Candidate`]s.

pub mod expansion;
pub mod filter;
pub mod method;
pub mod normalize;

use std::fmt;

use oxigraph::model::NamedNode;
use serde::{Deserialize, Serialize};

use crate::config::ResolutionConfig;
use crate::endpoint::SparqlEndpoint;
use crate::error::{ConfigError, KgResult, ResolveError};
use crate::sparql::{self, OutputVars, Solution, SparqlQuery};

pub use expansion::{ExpansionStep, TypeExpansionBuilder, TypeExpansionQuery};
pub use filter::{LabelFilter, LabelPredicate, PredicateKind};
pub use method::{MethodQuery, synthesize_label};
pub use normalize::{Candidate, Normalized, normalize};

/// Which builder produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    TypeExpansion,
    MethodHierarchy,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::TypeExpansion => write!(f, "type-expansion"),
            Strategy::MethodHierarchy => write!(f, "method-hierarchy"),
        }
    }
}

/// A query ready to run, together with how to shape its rows.
#[derive(Debug, Clone)]
pub enum ResolutionPlan {
    TypeExpansion(TypeExpansionQuery),
    MethodHierarchy(MethodQuery),
}

impl ResolutionPlan {
    pub fn strategy(&self) -> Strategy {
        match self {
            ResolutionPlan::TypeExpansion(_) => Strategy::TypeExpansion,
            ResolutionPlan::MethodHierarchy(_) => Strategy::MethodHierarchy,
        }
    }

    pub fn query(&self) -> &SparqlQuery {
        match self {
            ResolutionPlan::TypeExpansion(q) => q.query(),
            ResolutionPlan::MethodHierarchy(q) => q.query(),
        }
    }

    pub fn vars(&self) -> &OutputVars {
        match self {
            ResolutionPlan::TypeExpansion(q) => q.vars(),
            ResolutionPlan::MethodHierarchy(q) => q.vars(),
        }
    }

    /// Run the query and shape the rows.
    pub fn execute(&self, endpoint: &dyn SparqlEndpoint) -> KgResult<Resolution> {
        let strategy = self.strategy();
        tracing::debug!(%strategy, endpoint = %endpoint.describe(), "executing resolution");
        let solutions = endpoint.select(self.query())?.into_solutions();
        let rows = solutions.len();

        let Normalized {
            candidates,
            dropped,
        } = match self {
            ResolutionPlan::TypeExpansion(q) => normalize(solutions, q.vars()),
            ResolutionPlan::MethodHierarchy(q) => q.collect(solutions),
        };
        tracing::debug!(%strategy, rows, candidates = candidates.len(), dropped, "resolved");

        Ok(Resolution {
            strategy,
            vars: self.vars().clone(),
            candidates,
            dropped,
        })
    }
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub strategy: Strategy,
    pub vars: OutputVars,
    pub candidates: Vec<Candidate>,
    /// Rows discarded for lacking an identifier or label.
    pub dropped: usize,
}

impl Resolution {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates as solution bindings keyed by the output variables.
    pub fn to_bindings(&self) -> Vec<Solution> {
        self.candidates
            .iter()
            .map(|c| c.to_binding(&self.vars))
            .collect()
    }
}

/// Dispatches identifiers to a query builder.
#[derive(Debug, Clone)]
pub struct Resolver {
    method_sentinel: String,
    method_anchor: NamedNode,
    hazard_role: NamedNode,
    excluded_types: Vec<NamedNode>,
    hazard_excluded_labels: Vec<String>,
    result_limit: usize,
}

impl Resolver {
    /// Build a resolver, validating every configured IRI.
    pub fn new(config: &ResolutionConfig) -> Result<Self, ConfigError> {
        let iri = |key: &str, raw: &str| {
            NamedNode::new(raw).map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                message: format!("{raw:?} is not an IRI: {e}"),
            })
        };
        if config.method_sentinel.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "resolution.method_sentinel".into(),
                message: "must not be empty".into(),
            });
        }
        let excluded_types = config
            .excluded_types
            .iter()
            .map(|raw| iri("resolution.excluded_types", raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            method_sentinel: config.method_sentinel.clone(),
            method_anchor: iri("resolution.method_anchor", &config.method_anchor)?,
            hazard_role: iri("resolution.hazard_role", &config.hazard_role)?,
            excluded_types,
            hazard_excluded_labels: config.hazard_excluded_labels.clone(),
            result_limit: config.result_limit,
        })
    }

    /// Plan resolution of `identifier`, binding rows to the default output
    /// variables. Touches no engine.
    pub fn plan(&self, identifier: &str, filter: &LabelFilter) -> Result<ResolutionPlan, ResolveError> {
        self.plan_with_vars(identifier, filter, OutputVars::default())
    }

    /// Plan resolution with caller-chosen output variables.
    pub fn plan_with_vars(
        &self,
        identifier: &str,
        filter: &LabelFilter,
        vars: OutputVars,
    ) -> Result<ResolutionPlan, ResolveError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ResolveError::EmptyIdentifier {
                param: "entity_type".into(),
            });
        }
        if identifier == self.method_sentinel {
            return Ok(ResolutionPlan::MethodHierarchy(MethodQuery::new(
                &self.method_anchor,
                vars,
                filter,
            )?));
        }

        let anchor = sparql::parse_iri(identifier)?;
        let query = self.expansion(anchor, vars, filter).build()?;
        Ok(ResolutionPlan::TypeExpansion(query))
    }

    /// Plan the hazard listing: a type expansion anchored at the hazard role.
    pub fn plan_hazards(&self, filter: &LabelFilter) -> Result<ResolutionPlan, ResolveError> {
        let query = self
            .expansion(self.hazard_role.clone(), OutputVars::hazard(), filter)
            .exclude_labels(self.hazard_excluded_labels.iter().cloned())
            .build()?;
        Ok(ResolutionPlan::TypeExpansion(query))
    }

    /// Resolve `identifier` against `endpoint`.
    pub fn resolve(
        &self,
        endpoint: &dyn SparqlEndpoint,
        identifier: &str,
        filter: &LabelFilter,
    ) -> KgResult<Resolution> {
        self.plan(identifier, filter)?.execute(endpoint)
    }

    /// List hazards against `endpoint`.
    pub fn hazards(&self, endpoint: &dyn SparqlEndpoint, filter: &LabelFilter) -> KgResult<Resolution> {
        self.plan_hazards(filter)?.execute(endpoint)
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    fn expansion(&self, anchor: NamedNode, vars: OutputVars, filter: &LabelFilter) -> TypeExpansionBuilder {
        let predicates = filter.compile(vars.label());
        TypeExpansionBuilder::new(anchor)
            .output_vars(vars)
            .excluded_types(self.excluded_types.clone())
            .predicates(predicates)
            .limit(Some(self.result_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EndpointError, EndpointResult, KgError};
    use crate::sparql::{RdfTerm, SparqlResults};
    use crate::vocab;
    use std::sync::Mutex;

    /// Returns a canned document and records every query it sees.
    struct Canned {
        doc: SparqlResults,
        seen: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(doc: SparqlResults) -> Self {
            Self {
                doc,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl SparqlEndpoint for Canned {
        fn select(&self, query: &SparqlQuery) -> EndpointResult<SparqlResults> {
            self.seen.lock().unwrap().push(query.to_string());
            Ok(self.doc.clone())
        }

        fn raw(&self, _query: &str) -> EndpointResult<serde_json::Value> {
            Ok(serde_json::to_value(&self.doc).unwrap())
        }

        fn describe(&self) -> String {
            "canned".into()
        }
    }

    struct Down;

    impl SparqlEndpoint for Down {
        fn select(&self, _query: &SparqlQuery) -> EndpointResult<SparqlResults> {
            Err(EndpointError::Unreachable {
                url: "http://down".into(),
                attempts: 1,
                message: "connection refused".into(),
            })
        }

        fn raw(&self, _query: &str) -> EndpointResult<serde_json::Value> {
            unreachable!()
        }

        fn describe(&self) -> String {
            "down".into()
        }
    }

    fn resolver() -> Resolver {
        Resolver::new(&ResolutionConfig::default()).unwrap()
    }

    const ROLE: &str = "https://w3id.org/hacid/data/cs/wf/ops/Op/roles/SelectedVariable";

    #[test]
    fn sentinel_routes_to_method_hierarchy() {
        let plan = resolver().plan("method", &LabelFilter::none()).unwrap();
        assert_eq!(plan.strategy(), Strategy::MethodHierarchy);
        assert!(plan.query().as_str().contains(vocab::CLIMATE_CASE_METHOD));
    }

    #[test]
    fn sentinel_match_is_exact() {
        let err = resolver().plan("Method", &LabelFilter::none()).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidIri { .. }));
    }

    #[test]
    fn iris_route_to_type_expansion() {
        let plan = resolver().plan(ROLE, &LabelFilter::none()).unwrap();
        assert_eq!(plan.strategy(), Strategy::TypeExpansion);
        assert!(plan.query().as_str().contains(&format!("<{ROLE}>")));
        assert!(plan.query().as_str().contains("LIMIT 1000"));
    }

    #[test]
    fn empty_and_blank_identifiers_are_rejected() {
        for raw in ["", "   ", "\t\n"] {
            let err = resolver().plan(raw, &LabelFilter::none()).unwrap_err();
            assert!(matches!(err, ResolveError::EmptyIdentifier { .. }), "{raw:?}");
        }
    }

    #[test]
    fn malformed_identifier_never_reaches_the_engine() {
        let endpoint = Canned::new(SparqlResults::default());
        let err = resolver()
            .resolve(&endpoint, "not an iri", &LabelFilter::none())
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(endpoint.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_prefix_equals_no_prefix() {
        let r = resolver();
        let a = r.plan(ROLE, &LabelFilter::new(Some(""), None)).unwrap();
        let b = r.plan(ROLE, &LabelFilter::none()).unwrap();
        assert_eq!(a.query(), b.query());
    }

    #[test]
    fn planning_is_deterministic() {
        let r = resolver();
        let filter = LabelFilter::new(Some("t"), Some("air,temp"));
        assert_eq!(r.plan(ROLE, &filter).unwrap().query(), r.plan(ROLE, &filter).unwrap().query());
    }

    #[test]
    fn hazards_plan_uses_hazard_vars_and_exclusion() {
        let plan = resolver().plan_hazards(&LabelFilter::new(None, Some("flood"))).unwrap();
        let text = plan.query().as_str();
        assert!(text.contains(&format!("<{}>", vocab::HAZARD_ASSOCIATED_DATA)));
        assert!(text.contains("SELECT DISTINCT ?hazard ?hazardLabel"));
        assert!(text.contains(r#"LCASE("climate hazard type")"#));
        assert!(text.contains(r#"CONTAINS(LCASE(STR(?hazardLabel)), LCASE("flood"))"#));
    }

    #[test]
    fn configured_limit_is_applied() {
        let config = ResolutionConfig {
            result_limit: 25,
            ..Default::default()
        };
        let plan = Resolver::new(&config).unwrap().plan(ROLE, &LabelFilter::none()).unwrap();
        assert!(plan.query().as_str().contains("LIMIT 25"));
    }

    #[test]
    fn invalid_configured_iri_is_rejected() {
        let config = ResolutionConfig {
            method_anchor: "not an iri".into(),
            ..Default::default()
        };
        let err = Resolver::new(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "resolution.method_anchor"));
    }

    #[test]
    fn execute_normalizes_rows() {
        let doc = SparqlResults::from_solutions(
            vec!["classInstance".into(), "classInstanceLabel".into()],
            vec![
                Solution::from([
                    ("classInstance".to_string(), RdfTerm::uri("https://ex.org/pr")),
                    ("classInstanceLabel".to_string(), RdfTerm::literal("Precipitation")),
                ]),
                Solution::from([("classInstance".to_string(), RdfTerm::uri("https://ex.org/x"))]),
            ],
        );
        let endpoint = Canned::new(doc);
        let res = resolver().resolve(&endpoint, ROLE, &LabelFilter::none()).unwrap();
        assert_eq!(res.strategy, Strategy::TypeExpansion);
        assert_eq!(res.candidates, vec![Candidate::new("https://ex.org/pr", "Precipitation")]);
        assert_eq!(res.dropped, 1);
        assert_eq!(res.to_bindings()[0]["classInstanceLabel"].value(), "Precipitation");
    }

    #[test]
    fn document_without_results_is_empty() {
        let endpoint = Canned::new(SparqlResults::default());
        let res = resolver().resolve(&endpoint, ROLE, &LabelFilter::none()).unwrap();
        assert!(res.is_empty());
        assert_eq!(res.dropped, 0);
    }

    #[test]
    fn connectivity_failure_propagates() {
        let err = resolver().resolve(&Down, ROLE, &LabelFilter::none()).unwrap_err();
        assert!(matches!(err, KgError::Endpoint(EndpointError::Unreachable { .. })));
        assert!(err.is_unavailable());
    }
}
