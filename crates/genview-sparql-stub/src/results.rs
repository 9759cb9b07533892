//! SPARQL 1.1 query results in JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::DummyFeature;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

/// Variables bound for every feature, in head order.
pub const FEATURE_VARS: [&str; 7] = ["uniqueId", "start", "end", "name", "note", "strand", "type"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type")]
    pub term_type: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Term {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            term_type: "literal".to_string(),
            value: value.into(),
            datatype: None,
        }
    }

    pub fn integer(value: impl ToString) -> Self {
        Self {
            datatype: Some(XSD_INTEGER.to_string()),
            ..Self::literal(value.to_string())
        }
    }
}

pub type Binding = BTreeMap<String, Term>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Head {
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    pub bindings: Vec<Binding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    pub head: Head,
    pub results: Results,
}

impl SparqlResults {
    pub fn from_features<'a>(features: impl IntoIterator<Item = &'a DummyFeature>) -> Self {
        let bindings = features
            .into_iter()
            .map(|f| {
                BTreeMap::from([
                    ("uniqueId".to_string(), Term::literal(f.unique_id)),
                    ("start".to_string(), Term::integer(f.start)),
                    ("end".to_string(), Term::integer(f.end)),
                    ("name".to_string(), Term::literal(f.name)),
                    ("note".to_string(), Term::literal(f.note)),
                    ("strand".to_string(), Term::integer(f.strand)),
                    ("type".to_string(), Term::literal(f.feature_type)),
                ])
            })
            .collect();

        Self {
            head: Head {
                vars: FEATURE_VARS.iter().map(|v| v.to_string()).collect(),
            },
            results: Results { bindings },
        }
    }

    pub fn len(&self) -> usize {
        self.results.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }
}
