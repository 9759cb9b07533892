//! Built-in example configurations.
//!
//! Both presets expect their data files to be served from one static host
//! (`{base}/hg38.prefix.fa.gz`, ...); the base is a parameter so the same
//! layout works against a local or remote data server.

use serde_json::{json, Value};

use crate::config::normalize_base_uri;
use crate::configuration::{load, Configuration};
use crate::error::ConfigError;

/// Sequence track id shared by the presets' reference sequences.
pub const SEQUENCE_TRACK_ID: &str = "P6R5xbRqRr";

/// Named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Hg38,
    Dicty,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Hg38, Preset::Dicty];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hg38 => "hg38",
            Self::Dicty => "dicty",
        }
    }

    /// The raw document for this preset.
    pub fn document(&self, data_server: &str) -> Value {
        let base = normalize_base_uri(data_server);
        match self {
            Self::Hg38 => hg38_document(&base),
            Self::Dicty => dicty_document(&base),
        }
    }

    /// The validated configuration for this preset.
    pub fn load(&self, data_server: &str) -> Result<Configuration, ConfigError> {
        load(&self.document(data_server))
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hg38" | "grch38" | "human" => Ok(Self::Hg38),
            "dicty" | "dictyostelium" => Ok(Self::Dicty),
            other => Err(format!("unknown preset `{}` (expected hg38 or dicty)", other)),
        }
    }
}

pub fn hg38(data_server: &str) -> Result<Configuration, ConfigError> {
    Preset::Hg38.load(data_server)
}

pub fn dicty(data_server: &str) -> Result<Configuration, ConfigError> {
    Preset::Dicty.load(data_server)
}

fn uri(base: &str, file: &str) -> Value {
    json!({"uri": format!("{}/{}", base, file), "locationType": "UriLocation"})
}

fn hg38_document(base: &str) -> Value {
    const VIEW_ID: &str = "5m2YGi1-YcKWPmMIRnv49";

    json!({
        "assemblies": [{
            "name": "hg38",
            "aliases": ["GRCh38"],
            "sequence": {
                "type": "ReferenceSequenceTrack",
                "trackId": SEQUENCE_TRACK_ID,
                "adapter": {
                    "type": "BgzipFastaAdapter",
                    "fastaLocation": uri(base, "hg38.prefix.fa.gz"),
                    "faiLocation": uri(base, "hg38.prefix.fa.gz.fai"),
                    "gziLocation": uri(base, "hg38.prefix.fa.gz.gzi")
                }
            },
            "refNameAliases": {
                "adapter": {
                    "type": "RefNameAliasAdapter",
                    "location": uri(base, "hg38_aliases.txt")
                }
            }
        }],
        "tracks": [
            {
                "type": "FeatureTrack",
                "trackId": "ncbi_genes",
                "name": "NCBI RefSeq Genes",
                "assemblyNames": ["hg38"],
                "adapter": {
                    "type": "Gff3TabixAdapter",
                    "uri": format!("{}/GCA_000001405.15_GRCh38_full_analysis_set.refseq_annotation.sorted.gff.gz", base)
                }
            },
            {
                "type": "VariantTrack",
                "trackId": "ALL.wgs.shapeit2_integrated_snvindels_v2a.GRCh38.27022019.sites.vcf",
                "name": "1000 Genomes Variant Calls",
                "assemblyNames": ["hg38"],
                "category": ["1000 Genomes", "Variants"],
                "adapter": {
                    "type": "VcfTabixAdapter",
                    "uri": format!("{}/ALL.wgs.shapeit2_integrated_snvindels_v2a.GRCh38.27022019.sites.vcf.gz", base)
                }
            },
            {
                "type": "FeatureTrack",
                "trackId": "sparql_test_features",
                "name": "SPARQL Test Features",
                "assemblyNames": ["hg38"],
                "category": ["SPARQL", "Testing"],
                "adapter": {
                    "type": "SPARQLAdapter",
                    "endpoint": {"uri": "http://localhost:8090/sparql", "locationType": "UriLocation"},
                    "queryTemplate": "SELECT ?uniqueId ?start ?end ?name ?note ?strand ?type WHERE { FILTER ( (?start >= {start}) && (?end <= {end}) ) }",
                    "additionalQueryParams": []
                }
            }
        ],
        "aggregateTextSearchAdapters": [{
            "type": "TrixTextSearchAdapter",
            "textSearchAdapterId": "hg38-index",
            "ixFilePath": uri(base, "trix/hg38.ix"),
            "ixxFilePath": uri(base, "trix/hg38.ixx"),
            "metaFilePath": uri(base, "trix/hg38_meta.json"),
            "assemblyNames": ["hg38"]
        }],
        "defaultSession": {
            "drawerPosition": "right",
            "drawerWidth": 384,
            "widgets": {
                "GridBookmark": {"id": "GridBookmark", "type": "GridBookmarkWidget"},
                "hierarchicalTrackSelector": {
                    "id": "hierarchicalTrackSelector",
                    "type": "HierarchicalTrackSelectorWidget",
                    "view": VIEW_ID,
                    "faceted": {
                        "filterText": "",
                        "showSparse": false,
                        "showFilters": true,
                        "showOptions": false,
                        "panelWidth": 400
                    }
                }
            },
            "activeWidgets": {"hierarchicalTrackSelector": "hierarchicalTrackSelector"},
            "minimized": false,
            "id": "XoH3lXVcjuXCbqrJfnxjs",
            "name": "NewSession",
            "margin": 0,
            "views": [{
                "id": VIEW_ID,
                "minimized": false,
                "type": "LinearGenomeView",
                "offsetPx": 1161591458,
                "bpPerPx": 0.020000000000000004,
                "displayedRegions": [{
                    "reversed": false,
                    "refName": "1",
                    "start": 0,
                    "end": 248956422,
                    "assemblyName": "hg38"
                }],
                "tracks": [
                    {
                        "id": "pQBGRoGi3lG9nZ08r0B1d",
                        "type": "ReferenceSequenceTrack",
                        "configuration": SEQUENCE_TRACK_ID,
                        "minimized": false,
                        "pinned": false,
                        "displays": [{
                            "id": "C_cx5u8p1RXwFMNnERdkB",
                            "type": "LinearReferenceSequenceDisplay",
                            "heightPreConfig": 120,
                            "configuration": format!("{}-LinearReferenceSequenceDisplay", SEQUENCE_TRACK_ID),
                            "showForward": true,
                            "showReverse": true,
                            "showTranslation": true
                        }]
                    },
                    {
                        "id": "fQI51BAU9hyQ1tZoS9Xyr",
                        "type": "FeatureTrack",
                        "configuration": "ncbi_genes",
                        "minimized": false,
                        "pinned": false,
                        "displays": [{
                            "id": "bmtXgAZjm6GtUDaF59O-T",
                            "type": "LinearBasicDisplay",
                            "configuration": "ncbi_genes-LinearBasicDisplay"
                        }]
                    }
                ],
                "hideHeader": false,
                "hideHeaderOverview": false,
                "hideNoTracksActive": false,
                "trackSelectorType": "hierarchical",
                "showCenterLine": false,
                "showCytobandsSetting": true,
                "trackLabels": "",
                "showGridlines": true,
                "highlight": [],
                "colorByCDS": false,
                "showTrackOutlines": true,
                "bookmarkHighlightsVisible": true,
                "bookmarkLabelsVisible": true
            }],
            "stickyViewHeaders": true,
            "sessionTracks": [],
            "sessionAssemblies": [],
            "temporaryAssemblies": [],
            "connectionInstances": [],
            "sessionConnections": [],
            "focusedViewId": VIEW_ID,
            "sessionPlugins": []
        }
    })
}

fn dicty_document(base: &str) -> Value {
    json!({
        "assemblies": [{
            "name": "Dictyostelium Discoideum",
            "sequence": {
                "type": "ReferenceSequenceTrack",
                "trackId": SEQUENCE_TRACK_ID,
                "adapter": {
                    "type": "IndexedFastaAdapter",
                    "fastaLocation": uri(base, "canonical_core.fa"),
                    "faiLocation": uri(base, "canonical_core.fa.fai")
                }
            }
        }],
        "tracks": [{
            "type": "FeatureTrack",
            "trackId": "DDB0166986_features",
            "name": "DDB0166986 Features",
            "assemblyNames": ["Dictyostelium Discoideum"],
            "adapter": {
                "type": "Gff3TabixAdapter",
                "uri": format!("{}/DDB0166986.sorted.gff3.gz", base)
            }
        }]
    })
}
