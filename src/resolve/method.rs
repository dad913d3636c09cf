//! Method-hierarchy query builder.
//!
//! Methods form a two-level specialization tree under an anchor: general
//! methods specialize the anchor and specific methods specialize a general
//! one. Each specific method is offered as
//! `"<general> - <specific>"`, suffixed with its alternate labels in
//! parentheses when it has any.
//!
//! The store returns one row per alternate label; grouping, label synthesis
//! and the `contains` filter run here, where the order of alternate labels
//! is under our control.

use std::collections::HashMap;

use oxigraph::model::NamedNode;

use super::filter::{LabelFilter, LabelPredicate, matches_all};
use super::normalize::{Candidate, Normalized, resource_id};
use crate::error::ResolveError;
use crate::sparql::{OutputVars, Solution, SparqlQuery};
use crate::vocab;

const INTERNAL_VARS: &[&str] = &["general", "generalLabel", "specificLabel", "altLabel"];

/// Compose a method entry label.
///
/// ```
/// use hacid_kg::resolve::method::synthesize_label;
///
/// let label = synthesize_label("Statistical Method", "Linear Regression", &["OLS".into()]);
/// assert_eq!(label, "Statistical Method - Linear Regression (OLS)");
/// ```
pub fn synthesize_label(general: &str, specific: &str, alt_labels: &[String]) -> String {
    let base = format!("{general} - {specific}");
    if alt_labels.is_empty() {
        base
    } else {
        format!("{base} ({})", alt_labels.join(", "))
    }
}

/// A built method-hierarchy query.
#[derive(Debug, Clone)]
pub struct MethodQuery {
    query: SparqlQuery,
    vars: OutputVars,
    predicates: Vec<LabelPredicate>,
}

impl MethodQuery {
    /// Build the query under `anchor`. Only the `contains` half of `filter`
    /// applies; it is evaluated against the synthesized label.
    pub fn new(
        anchor: &NamedNode,
        vars: OutputVars,
        filter: &LabelFilter,
    ) -> Result<Self, ResolveError> {
        vars.ensure_disjoint(INTERNAL_VARS)?;
        if filter.has_prefix() {
            tracing::debug!(
                startswith = filter.startswith.as_deref(),
                "startswith is not applied to method entries"
            );
        }

        let id = vars.id();
        let query = SparqlQuery::new(format!(
            r#"{prologue}
SELECT DISTINCT {id} ?generalLabel ?specificLabel ?altLabel
WHERE {{
    {anchor} top:isSpecializedBy ?general .
    ?general top:isSpecializedBy {id} .
    ?general rdfs:label ?generalLabel .
    {id} rdfs:label ?specificLabel .
    OPTIONAL {{ {id} skos:altLabel ?altLabel }}
}}
ORDER BY {id} ?generalLabel ?specificLabel ?altLabel
"#,
            prologue = vocab::prologue(),
        ));
        let predicates = filter.compile_contains(vars.label());

        Ok(Self {
            query,
            vars,
            predicates,
        })
    }

    pub fn query(&self) -> &SparqlQuery {
        &self.query
    }

    pub fn vars(&self) -> &OutputVars {
        &self.vars
    }

    pub fn predicates(&self) -> &[LabelPredicate] {
        &self.predicates
    }

    /// Group rows into method entries, filter them, and order by label.
    pub fn collect(&self, solutions: Vec<Solution>) -> Normalized {
        let mut entries: Vec<MethodEntry> = Vec::new();
        let mut index: HashMap<(String, String, String), usize> = HashMap::new();
        let mut dropped = 0;

        for solution in solutions {
            let id = solution.get(self.vars.id().as_str()).and_then(resource_id);
            let general = solution.get("generalLabel").map(|t| t.value().to_string());
            let specific = solution.get("specificLabel").map(|t| t.value().to_string());
            let (Some(id), Some(general), Some(specific)) = (id, general, specific) else {
                tracing::warn!("dropping method row without identifier or labels");
                dropped += 1;
                continue;
            };

            let key = (id, general, specific);
            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    entries.push(MethodEntry {
                        id: key.0.clone(),
                        general: key.1.clone(),
                        specific: key.2.clone(),
                        alt_labels: Vec::new(),
                    });
                    index.insert(key, entries.len() - 1);
                    entries.len() - 1
                }
            };
            if let Some(alt) = solution.get("altLabel").map(|t| t.value()) {
                let alts = &mut entries[slot].alt_labels;
                if !alts.iter().any(|a| a == alt) {
                    alts.push(alt.to_string());
                }
            }
        }

        let mut candidates: Vec<Candidate> = entries
            .into_iter()
            .map(|e| Candidate::new(e.id, synthesize_label(&e.general, &e.specific, &e.alt_labels)))
            .filter(|c| matches_all(&self.predicates, &c.label))
            .collect();
        candidates.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));

        Normalized {
            candidates,
            dropped,
        }
    }
}

struct MethodEntry {
    id: String,
    general: String,
    specific: String,
    alt_labels: Vec<String>,
}
