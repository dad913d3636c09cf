//! Result normalizer: raw solutions → ordered (identifier, label) records.

use serde::{Deserialize, Serialize};

use crate::sparql::{OutputVars, RdfTerm, Solution};

/// A resolved role filler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// IRI, or `_:name` for a blank node.
    pub id: String,
    pub label: String,
    /// Language tag of the label, when the store reported one.
    #[serde(skip)]
    pub lang: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            lang: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.id.starts_with("_:")
    }

    /// Render back into a solution binding keyed by `vars`.
    pub fn to_binding(&self, vars: &OutputVars) -> Solution {
        let id = match self.id.strip_prefix("_:") {
            Some(name) => RdfTerm::Bnode {
                value: name.to_string(),
            },
            None => RdfTerm::uri(&self.id),
        };
        let label = RdfTerm::Literal {
            value: self.label.clone(),
            lang: self.lang.clone(),
            datatype: None,
        };
        Solution::from([
            (vars.id().as_str().to_string(), id),
            (vars.label().as_str().to_string(), label),
        ])
    }
}

/// Candidates in engine order, plus how many rows were unusable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub candidates: Vec<Candidate>,
    pub dropped: usize,
}

/// Identifier of a bound term, if it can name a resource.
pub(crate) fn resource_id(term: &RdfTerm) -> Option<String> {
    match term {
        RdfTerm::Uri { value } => Some(value.clone()),
        RdfTerm::Bnode { value } => Some(format!("_:{value}")),
        RdfTerm::Literal { .. } => None,
    }
}

/// Shape raw solutions into candidates.
///
/// Order is preserved. A row whose identifier is unbound (or bound to a
/// literal) or whose label is unbound is dropped and counted.
pub fn normalize(solutions: Vec<Solution>, vars: &OutputVars) -> Normalized {
    let mut out = Normalized::default();
    for (row, solution) in solutions.into_iter().enumerate() {
        let id = solution.get(vars.id().as_str()).and_then(resource_id);
        let label = solution.get(vars.label().as_str());
        match (id, label) {
            (Some(id), Some(label)) => {
                let lang = match label {
                    RdfTerm::Literal { lang, .. } => lang.clone(),
                    _ => None,
                };
                out.candidates.push(Candidate {
                    id,
                    label: label.value().to_string(),
                    lang,
                });
            }
            (id, _) => {
                tracing::warn!(
                    row,
                    id = id.as_deref().unwrap_or("<unbound>"),
                    id_var = vars.id().as_str(),
                    label_var = vars.label().as_str(),
                    "dropping solution without identifier or label"
                );
                out.dropped += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, RdfTerm)]) -> Solution {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn keeps_engine_order() {
        let vars = OutputVars::default();
        let rows = vec![
            row(&[
                ("classInstance", RdfTerm::uri("https://ex.org/b")),
                ("classInstanceLabel", RdfTerm::literal("Beta")),
            ]),
            row(&[
                ("classInstance", RdfTerm::uri("https://ex.org/a")),
                ("classInstanceLabel", RdfTerm::literal("Alpha")),
            ]),
        ];
        let out = normalize(rows, &vars);
        assert_eq!(out.dropped, 0);
        let labels: Vec<_> = out.candidates.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn incomplete_rows_are_dropped_and_counted() {
        let vars = OutputVars::hazard();
        let rows = vec![
            row(&[("hazard", RdfTerm::uri("https://ex.org/flood"))]),
            row(&[("hazardLabel", RdfTerm::literal("Orphan"))]),
            row(&[
                ("hazard", RdfTerm::literal("not a resource")),
                ("hazardLabel", RdfTerm::literal("Literal id")),
            ]),
            row(&[
                ("hazard", RdfTerm::uri("https://ex.org/drought")),
                ("hazardLabel", RdfTerm::literal("Drought")),
            ]),
        ];
        let out = normalize(rows, &vars);
        assert_eq!(out.dropped, 3);
        assert_eq!(out.candidates, vec![Candidate::new("https://ex.org/drought", "Drought")]);
    }

    #[test]
    fn binding_uses_output_variable_names() {
        let vars = OutputVars::hazard();
        let mut candidate = Candidate::new("https://ex.org/flood", "Flood");
        candidate.lang = Some("en".into());
        let binding = candidate.to_binding(&vars);
        assert_eq!(binding["hazard"], RdfTerm::uri("https://ex.org/flood"));
        assert_eq!(
            serde_json::to_value(&binding["hazardLabel"]).unwrap(),
            serde_json::json!({"type": "literal", "value": "Flood", "xml:lang": "en"})
        );
    }

    #[test]
    fn blank_nodes_round_trip_through_bindings() {
        let vars = OutputVars::default();
        let rows = vec![row(&[
            ("classInstance", RdfTerm::Bnode { value: "b7".into() }),
            ("classInstanceLabel", RdfTerm::literal("Anonymous")),
        ])];
        let out = normalize(rows, &vars);
        assert!(out.candidates[0].is_blank());
        assert_eq!(
            out.candidates[0].to_binding(&vars)["classInstance"],
            RdfTerm::Bnode { value: "b7".into() }
        );
    }

    #[test]
    fn pairs_serialize_without_language() {
        let mut candidate = Candidate::new("https://ex.org/a", "A");
        candidate.lang = Some("en".into());
        assert_eq!(
            serde_json::to_value(&candidate).unwrap(),
            serde_json::json!({"id": "https://ex.org/a", "label": "A"})
        );
    }
}
