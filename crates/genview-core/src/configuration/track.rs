//! Track descriptions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::adapter::Adapter;

/// The `type` of a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrackKind {
    Feature,
    Variant,
    ReferenceSequence,
    Alignments,
    Quantitative,
    Other(String),
}

impl TrackKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Feature => "FeatureTrack",
            Self::Variant => "VariantTrack",
            Self::ReferenceSequence => "ReferenceSequenceTrack",
            Self::Alignments => "AlignmentsTrack",
            Self::Quantitative => "QuantitativeTrack",
            Self::Other(s) => s,
        }
    }

    /// Display type the engine shows this kind of track with in a linear view.
    pub fn default_display_type(&self) -> &str {
        match self {
            Self::Feature => "LinearBasicDisplay",
            Self::Variant => "LinearVariantDisplay",
            Self::ReferenceSequence => "LinearReferenceSequenceDisplay",
            Self::Alignments => "LinearAlignmentsDisplay",
            Self::Quantitative => "LinearWiggleDisplay",
            Self::Other(_) => "LinearBasicDisplay",
        }
    }
}

impl From<String> for TrackKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "FeatureTrack" => Self::Feature,
            "VariantTrack" => Self::Variant,
            "ReferenceSequenceTrack" => Self::ReferenceSequence,
            "AlignmentsTrack" => Self::Alignments,
            "QuantitativeTrack" => Self::Quantitative,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for TrackKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<TrackKind> for String {
    fn from(kind: TrackKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named data layer bound to one or more assemblies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(rename = "type")]
    pub track_type: TrackKind,
    /// Globally unique across the configuration.
    pub track_id: String,
    /// Label shown in the track selector.
    pub name: String,
    pub assembly_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<String>,
    pub adapter: Adapter,
    /// Fields the core does not model (displays, metadata, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    pub fn new(
        track_type: TrackKind,
        track_id: impl Into<String>,
        name: impl Into<String>,
        assembly_names: Vec<String>,
        adapter: Adapter,
    ) -> Self {
        Self {
            track_type,
            track_id: track_id.into(),
            name: name.into(),
            assembly_names,
            category: Vec::new(),
            adapter,
            extra: Map::new(),
        }
    }

    pub fn with_category(mut self, category: &[&str]) -> Self {
        self.category = category.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Display configuration id the engine derives for `display_type`.
    pub fn display_configuration(&self, display_type: &str) -> String {
        format!("{}-{}", self.track_id, display_type)
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.iter().any(|c| c == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_kind_strings() {
        assert_eq!(TrackKind::from("VariantTrack"), TrackKind::Variant);
        assert_eq!(
            TrackKind::from("HicTrack"),
            TrackKind::Other("HicTrack".to_string())
        );
        assert_eq!(String::from(TrackKind::Feature), "FeatureTrack");
        assert_eq!(TrackKind::Variant.default_display_type(), "LinearVariantDisplay");
    }

    #[test]
    fn test_track_keeps_unmodelled_fields() {
        let value = json!({
            "type": "FeatureTrack",
            "trackId": "ncbi_genes",
            "name": "NCBI RefSeq Genes",
            "assemblyNames": ["hg38"],
            "adapter": {"type": "Gff3TabixAdapter", "uri": "http://h/genes.gff.gz"},
            "metadata": {"source": "NCBI"},
        });
        let track: Track = serde_json::from_value(value).unwrap();
        assert_eq!(track.track_type, TrackKind::Feature);
        assert_eq!(track.extra.get("metadata"), Some(&json!({"source": "NCBI"})));
        assert_eq!(
            track.display_configuration("LinearBasicDisplay"),
            "ncbi_genes-LinearBasicDisplay"
        );

        let again: Track = serde_json::from_value(serde_json::to_value(&track).unwrap()).unwrap();
        assert_eq!(again, track);
    }
}
