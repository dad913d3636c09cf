//! IRIs of the vocabularies the resolver queries against.

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";

/// HACID top-level ontology.
pub const TOP: &str = "https://w3id.org/hacid/onto/top-level/";

/// Workflow data namespace of the climate-service knowledge base.
pub const WF: &str = "https://w3id.org/hacid/data/cs/wf/";

/// Sentinel type that never contributes role fillers.
pub const INTERVAL: &str = "https://w3id.org/hacid/onto/top-level/Interval";

/// Root of the method specialization hierarchy.
pub const CLIMATE_CASE_METHOD: &str = "https://w3id.org/hacid/data/cs/wf/methods/ClimateCaseMethod";

/// Role whose expected type enumerates the climate hazards.
pub const HAZARD_ASSOCIATED_DATA: &str =
    "https://w3id.org/hacid/data/cs/wf/app-profile/roles/HazardAssociatedData";

/// Identifier that selects the method-hierarchy strategy.
pub const METHOD_SENTINEL: &str = "method";

/// Label hidden from the hazard listing.
pub const CLIMATE_HAZARD_TYPE_LABEL: &str = "climate hazard type";

/// Public endpoint of the climate-service knowledge base.
pub const DEFAULT_ENDPOINT: &str = "http://w3id.org/hacid/cs/sparql";

/// `PREFIX` block shared by every generated query.
pub fn prologue() -> String {
    format!(
        "PREFIX rdf: <{RDF}>\n\
         PREFIX rdfs: <{RDFS}>\n\
         PREFIX owl: <{OWL}>\n\
         PREFIX skos: <{SKOS}>\n\
         PREFIX top: <{TOP}>\n"
    )
}
