//! Browse queries that sit beside resolution: classes and class instances.

use oxigraph::model::NamedNode;

use crate::resolve::filter::{LabelFilter, render_filters};
use crate::sparql::{self, OutputVars, SparqlQuery};
use crate::vocab;

/// Every named class with its label.
pub fn classes_query() -> SparqlQuery {
    SparqlQuery::new(format!(
        r#"{prologue}
SELECT DISTINCT ?class ?classLabel
WHERE {{
    ?class rdf:type owl:Class .
    ?class rdfs:label ?classLabel .
    FILTER(?class != owl:Thing && ?class != owl:Nothing && !isBlank(?class))
}}
ORDER BY ?classLabel ?class
"#,
        prologue = vocab::prologue()
    ))
}

/// Labelled instances of `class`, restricted to `languages` when non-empty.
pub fn instances_query(
    class: &NamedNode,
    filter: &LabelFilter,
    languages: &[String],
    limit: usize,
) -> SparqlQuery {
    let vars = OutputVars::class_instance();
    let (id, label) = (vars.id(), vars.label());

    let mut filters = render_filters(&filter.compile(label), "    ");
    if let Some(lang) = sparql::language_filter(label, languages) {
        filters.push_str(&format!("    {lang}\n"));
    }

    SparqlQuery::new(format!(
        r#"{prologue}
SELECT DISTINCT {id} {label}
WHERE {{
    {id} a {class} .
    {id} rdfs:label {label} .
{filters}}}
ORDER BY {label} {id}
LIMIT {limit}
"#,
        prologue = vocab::prologue(),
    ))
}
