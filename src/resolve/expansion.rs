//! Type-expansion query builder.
//!
//! Starting from a role (or entity type), follow its `top:hasExpectedType`
//! and then any number of class-algebra hops: union and intersection
//! members (walked through the RDF list) and `owl:allValuesFrom` fillers.
//! Every term reached this way is on the *frontier*. A subject is a
//! candidate when it is an instance of a frontier term, or when a frontier
//! term is an `owl:hasValue` restriction the subject satisfies.
//!
//! The closure is delegated to the store as a `*` property path, so cycles
//! in the class algebra terminate (path evaluation is set based).

use oxigraph::model::NamedNode;

use super::filter::{LabelPredicate, render_filters};
use crate::error::ResolveError;
use crate::sparql::{self, OutputVars, SparqlQuery, string_literal};
use crate::vocab;

/// Default cap on type-expansion results.
pub const DEFAULT_LIMIT: usize = 1000;

/// Variables the generated pattern uses internally.
const INTERNAL_VARS: &[&str] = &["itemClass", "restrictedProperty", "restrictedValue"];

/// One kind of edge the expansion may traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionStep {
    /// `owl:unionOf` list member.
    Union,
    /// `owl:intersectionOf` list member.
    Intersection,
    /// `owl:allValuesFrom` filler of a restriction.
    AllValuesFrom,
}

impl ExpansionStep {
    pub const ALL: [ExpansionStep; 3] = [
        ExpansionStep::Union,
        ExpansionStep::Intersection,
        ExpansionStep::AllValuesFrom,
    ];
}

/// Render the closure path: `top:hasExpectedType/(step|step|...)*`.
fn expansion_path(steps: &[ExpansionStep]) -> String {
    let list_members: Vec<&str> = steps
        .iter()
        .filter_map(|s| match s {
            ExpansionStep::Union => Some("owl:unionOf"),
            ExpansionStep::Intersection => Some("owl:intersectionOf"),
            ExpansionStep::AllValuesFrom => None,
        })
        .collect();

    let mut alternatives = Vec::new();
    if !list_members.is_empty() {
        alternatives.push(format!("({})/rdf:rest*/rdf:first", list_members.join("|")));
    }
    if steps.contains(&ExpansionStep::AllValuesFrom) {
        alternatives.push("owl:allValuesFrom".to_string());
    }

    if alternatives.is_empty() {
        "top:hasExpectedType".to_string()
    } else {
        format!("top:hasExpectedType/({})*", alternatives.join("|"))
    }
}

/// Builder for a type-expansion query rooted at one anchor IRI.
#[derive(Debug, Clone)]
pub struct TypeExpansionBuilder {
    anchor: NamedNode,
    vars: OutputVars,
    steps: Vec<ExpansionStep>,
    excluded_types: Vec<NamedNode>,
    excluded_labels: Vec<String>,
    label_languages: Vec<String>,
    predicates: Vec<LabelPredicate>,
    limit: Option<usize>,
}

impl TypeExpansionBuilder {
    /// Start a builder with the default expansion, `top:Interval` excluded
    /// and the default cap.
    pub fn new(anchor: NamedNode) -> Self {
        Self {
            anchor,
            vars: OutputVars::default(),
            steps: ExpansionStep::ALL.to_vec(),
            excluded_types: vec![NamedNode::new_unchecked(vocab::INTERVAL)],
            excluded_labels: Vec::new(),
            label_languages: Vec::new(),
            predicates: Vec::new(),
            limit: Some(DEFAULT_LIMIT),
        }
    }

    pub fn output_vars(mut self, vars: OutputVars) -> Self {
        self.vars = vars;
        self
    }

    pub fn steps(mut self, steps: &[ExpansionStep]) -> Self {
        self.steps = steps.to_vec();
        self
    }

    /// Replace the frontier exclusion list.
    pub fn excluded_types(mut self, types: Vec<NamedNode>) -> Self {
        self.excluded_types = types;
        self
    }

    /// Hide candidates whose label equals one of these, ignoring case.
    pub fn exclude_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_labels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn label_languages(mut self, languages: Vec<String>) -> Self {
        self.label_languages = languages;
        self
    }

    /// Label predicates, compiled against this builder's label variable.
    pub fn predicates(mut self, predicates: Vec<LabelPredicate>) -> Self {
        self.predicates = predicates;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn label_var(&self) -> &oxigraph::sparql::Variable {
        self.vars.label()
    }

    pub fn build(self) -> Result<TypeExpansionQuery, ResolveError> {
        self.vars.ensure_disjoint(INTERNAL_VARS)?;

        let id = self.vars.id();
        let label = self.vars.label();
        let mut body = String::new();

        body.push_str(&format!(
            "    {anchor} {path} ?itemClass .\n",
            anchor = self.anchor,
            path = expansion_path(&self.steps),
        ));
        if !self.excluded_types.is_empty() {
            let excluded = self
                .excluded_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            body.push_str(&format!("    FILTER(?itemClass NOT IN ({excluded}))\n"));
        }
        body.push_str(&format!(
            r#"    {{
        {id} a ?itemClass .
    }} UNION {{
        ?itemClass a owl:Restriction ;
            owl:onProperty ?restrictedProperty ;
            owl:hasValue ?restrictedValue .
        {id} ?restrictedProperty ?restrictedValue .
    }}
    {id} rdfs:label {label} .
"#
        ));
        for excluded in &self.excluded_labels {
            body.push_str(&format!(
                "    FILTER(LCASE(STR({label})) != LCASE({}))\n",
                string_literal(excluded)
            ));
        }
        if let Some(filter) = sparql::language_filter(label, &self.label_languages) {
            body.push_str(&format!("    {filter}\n"));
        }
        body.push_str(&render_filters(&self.predicates, "    "));

        let mut text = format!(
            "{prologue}\nSELECT DISTINCT {id} {label}\nWHERE {{\n{body}}}\nORDER BY {label} {id}\n",
            prologue = vocab::prologue(),
        );
        if let Some(limit) = self.limit {
            text.push_str(&format!("LIMIT {limit}\n"));
        }

        Ok(TypeExpansionQuery {
            query: SparqlQuery::new(text),
            vars: self.vars,
            limit: self.limit,
        })
    }
}

/// A built type-expansion query and the variables its rows carry.
#[derive(Debug, Clone)]
pub struct TypeExpansionQuery {
    query: SparqlQuery,
    vars: OutputVars,
    limit: Option<usize>,
}

impl TypeExpansionQuery {
    pub fn query(&self) -> &SparqlQuery {
        &self.query
    }

    pub fn vars(&self) -> &OutputVars {
        &self.vars
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::filter::LabelFilter;

    fn anchor() -> NamedNode {
        NamedNode::new("https://w3id.org/hacid/data/cs/wf/ops/Op/roles/SelectedVariable").unwrap()
    }

    #[test]
    fn default_path_covers_all_combinators() {
        assert_eq!(
            expansion_path(&ExpansionStep::ALL),
            "top:hasExpectedType/((owl:unionOf|owl:intersectionOf)/rdf:rest*/rdf:first|owl:allValuesFrom)*"
        );
    }

    #[test]
    fn restricted_paths() {
        assert_eq!(expansion_path(&[]), "top:hasExpectedType");
        assert_eq!(
            expansion_path(&[ExpansionStep::AllValuesFrom]),
            "top:hasExpectedType/(owl:allValuesFrom)*"
        );
        assert_eq!(
            expansion_path(&[ExpansionStep::Union]),
            "top:hasExpectedType/((owl:unionOf)/rdf:rest*/rdf:first)*"
        );
    }

    #[test]
    fn query_shape() {
        let q = TypeExpansionBuilder::new(anchor()).build().unwrap();
        let text = q.query().as_str();
        assert!(text.contains(&format!("<{}> top:hasExpectedType/", anchor().as_str())));
        assert!(text.contains(&format!("FILTER(?itemClass NOT IN (<{}>))", vocab::INTERVAL)));
        assert!(text.contains("SELECT DISTINCT ?classInstance ?classInstanceLabel"));
        assert!(text.contains("owl:hasValue ?restrictedValue"));
        assert!(text.contains("?classInstance rdfs:label ?classInstanceLabel ."));
        assert!(text.contains("ORDER BY ?classInstanceLabel ?classInstance"));
        assert!(text.trim_end().ends_with("LIMIT 1000"));
        assert_eq!(q.limit(), Some(1000));
    }

    #[test]
    fn filters_bind_to_the_label_variable() {
        let vars = OutputVars::hazard();
        let predicates = LabelFilter::new(Some("fl"), Some("ood")).compile(vars.label());
        let q = TypeExpansionBuilder::new(anchor())
            .output_vars(vars)
            .predicates(predicates)
            .exclude_labels(["climate hazard type"])
            .build()
            .unwrap();
        let text = q.query().as_str();
        assert!(text.contains("SELECT DISTINCT ?hazard ?hazardLabel"));
        assert!(text.contains(r#"STRSTARTS(LCASE(STR(?hazardLabel)), LCASE("fl"))"#));
        assert!(text.contains(r#"CONTAINS(LCASE(STR(?hazardLabel)), LCASE("ood"))"#));
        assert!(text.contains(r#"FILTER(LCASE(STR(?hazardLabel)) != LCASE("climate hazard type"))"#));
        assert!(!text.contains("classInstance"));
    }

    #[test]
    fn no_exclusions_no_not_in() {
        let q = TypeExpansionBuilder::new(anchor())
            .excluded_types(Vec::new())
            .limit(None)
            .build()
            .unwrap();
        assert!(!q.query().as_str().contains("NOT IN"));
        assert!(!q.query().as_str().contains("LIMIT"));
    }

    #[test]
    fn reserved_output_names_are_rejected() {
        let vars = OutputVars::new("itemClass", "itemLabel").unwrap();
        let err = TypeExpansionBuilder::new(anchor())
            .output_vars(vars)
            .build()
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidVariable { .. }));
    }

    #[test]
    fn language_restriction_is_rendered() {
        let q = TypeExpansionBuilder::new(anchor())
            .label_languages(vec!["en".into()])
            .build()
            .unwrap();
        assert!(q.query().as_str().contains(r#"FILTER(lang(?classInstanceLabel) = "en")"#));
    }
}
