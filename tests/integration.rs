//! End-to-end resolution tests against an in-memory store.
//!
//! Every test loads `tests/fixtures/climate.ttl` into an oxigraph store and
//! runs the real builders, dispatcher and normalizer over it.

use std::path::PathBuf;

use hacid_kg::browse;
use hacid_kg::config::ResolutionConfig;
use hacid_kg::endpoint::{LocalEndpoint, SparqlEndpoint};
use hacid_kg::resolve::{LabelFilter, Resolution, Resolver, Strategy};
use hacid_kg::sparql::{RdfTerm, parse_iri};

const SELECTED_VARIABLE: &str =
    "https://w3id.org/hacid/data/cs/wf/ops/FilterClimateProjectionsByVariable/roles/SelectedVariable";
const ROLES: &str = "https://w3id.org/hacid/data/cs/wf/app-profile/roles/";

fn fixture() -> LocalEndpoint {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/climate.ttl");
    LocalEndpoint::from_file(&path).unwrap()
}

fn resolver() -> Resolver {
    Resolver::new(&ResolutionConfig::default()).unwrap()
}

fn labels(res: &Resolution) -> Vec<&str> {
    res.candidates.iter().map(|c| c.label.as_str()).collect()
}

fn resolve(identifier: &str, filter: LabelFilter) -> Resolution {
    resolver().resolve(&fixture(), identifier, &filter).unwrap()
}

#[test]
fn union_and_intersection_members_are_expanded() {
    let res = resolve(SELECTED_VARIABLE, LabelFilter::none());
    assert_eq!(res.strategy, Strategy::TypeExpansion);
    assert_eq!(
        labels(&res),
        vec![
            "Air temperature",
            "Near-surface air temperature",
            "Precipitation",
            "Sea surface temperature",
            "Surface air temperature",
        ]
    );
    assert_eq!(res.dropped, 0);
}

#[test]
fn candidate_reached_twice_is_reported_once() {
    let res = resolve(SELECTED_VARIABLE, LabelFilter::none());
    let tas = res
        .candidates
        .iter()
        .filter(|c| c.id == "https://w3id.org/hacid/data/cs/variables/tas")
        .count();
    assert_eq!(tas, 1);
}

#[test]
fn results_are_sorted_by_label() {
    let roles = [
        SELECTED_VARIABLE.to_string(),
        format!("{ROLES}Scenario"),
        format!("{ROLES}SourceDataset"),
    ];
    for role in &roles {
        let res = resolve(role, LabelFilter::none());
        let got = labels(&res);
        let mut sorted = got.clone();
        sorted.sort();
        assert_eq!(got, sorted, "{role}");
    }
}

#[test]
fn value_restriction_matches_subjects_directly() {
    let res = resolve(&format!("{ROLES}Scenario"), LabelFilter::none());
    assert_eq!(labels(&res), vec!["SSP1-2.6", "SSP5-8.5"]);
}

#[test]
fn all_values_from_filler_is_expanded() {
    let res = resolve(&format!("{ROLES}SourceDataset"), LabelFilter::none());
    assert_eq!(labels(&res), vec!["CMIP6", "CORDEX"]);
}

#[test]
fn sentinel_type_contributes_nothing() {
    for role in ["ReferencePeriod", "FuturePeriod"] {
        let res = resolve(&format!("{ROLES}{role}"), LabelFilter::none());
        assert!(res.is_empty(), "{role}: {:?}", labels(&res));
    }
}

#[test]
fn role_without_expected_type_is_empty_not_an_error() {
    let res = resolve(&format!("{ROLES}Unconstrained"), LabelFilter::none());
    assert!(res.is_empty());
    let res = resolve("https://w3id.org/hacid/data/cs/wf/nowhere", LabelFilter::none());
    assert!(res.is_empty());
}

#[test]
fn contains_tokens_narrow_the_result() {
    let all = resolve(SELECTED_VARIABLE, LabelFilter::none());
    let narrowed = resolve(SELECTED_VARIABLE, LabelFilter::new(None, Some("AIR,temp")));
    assert_eq!(
        labels(&narrowed),
        vec!["Air temperature", "Near-surface air temperature", "Surface air temperature"]
    );
    for c in &narrowed.candidates {
        assert!(all.candidates.contains(c));
        let lower = c.label.to_lowercase();
        assert!(lower.contains("air") && lower.contains("temp"));
    }
}

#[test]
fn prefix_is_case_insensitive() {
    let res = resolve(SELECTED_VARIABLE, LabelFilter::new(Some("s"), None));
    assert_eq!(labels(&res), vec!["Sea surface temperature", "Surface air temperature"]);
}

#[test]
fn empty_prefix_equals_no_prefix() {
    assert_eq!(
        resolve(SELECTED_VARIABLE, LabelFilter::new(Some(""), None)),
        resolve(SELECTED_VARIABLE, LabelFilter::none())
    );
}

#[test]
fn repeated_resolution_is_idempotent() {
    let endpoint = fixture();
    let r = resolver();
    let filter = LabelFilter::new(Some("s"), Some("temp"));
    let first = r.resolve(&endpoint, SELECTED_VARIABLE, &filter).unwrap();
    let second = r.resolve(&endpoint, SELECTED_VARIABLE, &filter).unwrap();
    assert_eq!(first, second);
}

#[test]
fn result_limit_caps_type_expansion() {
    let config = ResolutionConfig {
        result_limit: 2,
        ..Default::default()
    };
    let res = Resolver::new(&config)
        .unwrap()
        .resolve(&fixture(), SELECTED_VARIABLE, &LabelFilter::none())
        .unwrap();
    assert_eq!(labels(&res), vec!["Air temperature", "Near-surface air temperature"]);
}

#[test]
fn method_sentinel_walks_two_levels() {
    let res = resolve("method", LabelFilter::none());
    assert_eq!(res.strategy, Strategy::MethodHierarchy);
    assert_eq!(
        labels(&res),
        vec![
            "Bias Correction - Quantile Mapping (QM)",
            "Statistical Method - Linear Regression (Least Squares, OLS)",
            "Statistical Method - Logistic Regression",
        ]
    );
    assert!(res.candidates.iter().all(|c| !c.label.contains("Ridge")));
}

#[test]
fn method_filters_use_contains_only() {
    let res = resolve("method", LabelFilter::new(Some("nothing starts like this"), Some("regression")));
    assert_eq!(
        labels(&res),
        vec![
            "Statistical Method - Linear Regression (Least Squares, OLS)",
            "Statistical Method - Logistic Regression",
        ]
    );

    // Alternate labels are part of the searchable text.
    let res = resolve("method", LabelFilter::new(None, Some("qm")));
    assert_eq!(labels(&res), vec!["Bias Correction - Quantile Mapping (QM)"]);
}

#[test]
fn hazards_hide_the_hazard_type_label() {
    let res = resolver().hazards(&fixture(), &LabelFilter::none()).unwrap();
    assert_eq!(labels(&res), vec!["Drought", "Heatwave", "River flood"]);
    let bindings = res.to_bindings();
    assert_eq!(
        bindings[0]["hazard"],
        RdfTerm::uri("https://w3id.org/hacid/data/cs/hazards/drought")
    );
    assert_eq!(
        bindings[0]["hazardLabel"],
        RdfTerm::Literal {
            value: "Drought".into(),
            lang: Some("en".into()),
            datatype: None,
        }
    );
}

#[test]
fn hazards_accept_filters() {
    let res = resolver()
        .hazards(&fixture(), &LabelFilter::new(Some("r"), Some("flood")))
        .unwrap();
    assert_eq!(labels(&res), vec!["River flood"]);
}

#[test]
fn invalid_identifier_is_an_input_error() {
    let err = resolver()
        .resolve(&fixture(), "http://x> } ; DROP ALL ; { <http://y", &LabelFilter::none())
        .unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn classes_listing_skips_owl_thing() {
    let endpoint = fixture();
    let rows = endpoint.select(&browse::classes_query()).unwrap().into_solutions();
    let classes: Vec<_> = rows.iter().map(|r| r["class"].value()).collect();
    assert!(classes.contains(&"https://w3id.org/hacid/onto/cs/ClimateHazard"));
    assert!(!classes.contains(&"http://www.w3.org/2002/07/owl#Thing"));
}

#[test]
fn instances_listing_keeps_english_labels() {
    let endpoint = fixture();
    let class = parse_iri("https://w3id.org/hacid/onto/cs/Glacier").unwrap();
    let languages = ResolutionConfig::default().instance_languages;
    let query = browse::instances_query(&class, &LabelFilter::none(), &languages, 1000);
    let rows = endpoint.select(&query).unwrap().into_solutions();
    let labels: Vec<_> = rows.iter().map(|r| r["classInstanceLabel"].value()).collect();
    assert_eq!(labels, vec!["Aletsch Glacier", "Rhone Glacier"]);
}

#[test]
fn raw_queries_pass_through() {
    let doc = fixture()
        .raw("PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#> SELECT ?l WHERE { <https://w3id.org/hacid/data/cs/datasets/cmip6> rdfs:label ?l }")
        .unwrap();
    assert_eq!(doc["head"]["vars"], serde_json::json!(["l"]));
    assert_eq!(doc["results"]["bindings"][0]["l"]["value"], "CMIP6");
}
