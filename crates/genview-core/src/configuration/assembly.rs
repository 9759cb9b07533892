//! Assembly descriptions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::adapter::Adapter;
use super::track::TrackKind;

/// The reference sequence track every assembly carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceTrack {
    #[serde(rename = "type", default = "reference_sequence")]
    pub track_type: TrackKind,
    pub track_id: String,
    pub adapter: Adapter,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn reference_sequence() -> TrackKind {
    TrackKind::ReferenceSequence
}

/// Resolver for alternative reference sequence names (`1` vs `chr1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefNameAliases {
    pub adapter: Adapter,
}

/// A named reference genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    pub name: String,
    /// Other names tracks may use to refer to this assembly.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub sequence: SequenceTrack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_name_aliases: Option<RefNameAliases>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Assembly {
    pub fn new(name: impl Into<String>, sequence_track_id: impl Into<String>, adapter: Adapter) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            display_name: None,
            sequence: SequenceTrack {
                track_type: TrackKind::ReferenceSequence,
                track_id: sequence_track_id.into(),
                adapter,
                extra: Map::new(),
            },
            ref_name_aliases: None,
            extra: Map::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_ref_name_aliases(mut self, adapter: Adapter) -> Self {
        self.ref_name_aliases = Some(RefNameAliases { adapter });
        self
    }

    /// The name followed by every alias.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `name` is this assembly's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.all_names().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Location;

    fn fasta() -> Adapter {
        Adapter::IndexedFasta {
            fasta: Location::uri("http://h/canonical_core.fa"),
            fai: Location::uri("http://h/canonical_core.fa.fai"),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_aliases() {
        let asm = Assembly::new("hg38", "P6R5xbRqRr", fasta()).with_aliases(&["GRCh38"]);
        assert!(asm.answers_to("hg38"));
        assert!(asm.answers_to("GRCh38"));
        assert!(!asm.answers_to("hg19"));
        assert_eq!(asm.all_names().count(), 2);
    }

    #[test]
    fn test_sequence_type_defaults() {
        let value = serde_json::json!({
            "name": "Dictyostelium Discoideum",
            "sequence": {
                "trackId": "P6R5xbRqRr",
                "adapter": fasta().to_value(),
            }
        });
        let asm: Assembly = serde_json::from_value(value).unwrap();
        assert_eq!(asm.sequence.track_type, TrackKind::ReferenceSequence);
        assert!(asm.ref_name_aliases.is_none());
    }
}
