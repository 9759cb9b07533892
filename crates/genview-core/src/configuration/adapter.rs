//! Adapter descriptions.
//!
//! An adapter tells the engine how to obtain and parse one data source. The
//! core knows the required fields of each recognised `type` tag and checks
//! that they are present; it never interprets the payload. Unrecognised
//! tags are carried through untouched as [`Adapter::Unknown`].

use std::cell::RefCell;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::location::{check_nested_addresses, Location};
use crate::error::AdapterError;

/// Recognised adapter type tags.
pub mod adapter_types {
    pub const BGZIP_FASTA: &str = "BgzipFastaAdapter";
    pub const INDEXED_FASTA: &str = "IndexedFastaAdapter";
    pub const UNINDEXED_FASTA: &str = "UnindexedFastaAdapter";
    pub const CHROM_SIZES: &str = "ChromSizesAdapter";
    pub const TWO_BIT: &str = "TwoBitAdapter";
    pub const GFF3_TABIX: &str = "Gff3TabixAdapter";
    pub const GFF3: &str = "Gff3Adapter";
    pub const VCF_TABIX: &str = "VcfTabixAdapter";
    pub const SPARQL: &str = "SPARQLAdapter";
    pub const REF_NAME_ALIAS: &str = "RefNameAliasAdapter";
    pub const TRIX_TEXT_SEARCH: &str = "TrixTextSearchAdapter";
}

use adapter_types as t;

/// Index flavour of a tabix-indexed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    #[default]
    Tbi,
    Csi,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tbi => "TBI",
            Self::Csi => "CSI",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Self::Tbi => ".tbi",
            Self::Csi => ".csi",
        }
    }
}

/// Index file of a tabix-indexed adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabixIndex {
    pub location: Location,
    pub index_type: IndexType,
    pub extra: Map<String, Value>,
}

impl TabixIndex {
    /// The conventional `{data}.tbi` sibling of a data file.
    pub fn beside(data: &Location) -> Self {
        let index_type = IndexType::default();
        Self {
            location: data.with_suffix(index_type.suffix()),
            index_type,
            extra: Map::new(),
        }
    }

    fn to_value(&self) -> Value {
        let mut obj = self.extra.clone();
        obj.insert("location".to_string(), self.location.to_value());
        obj.insert("indexType".to_string(), json!(self.index_type.as_str()));
        Value::Object(obj)
    }
}

/// A tagged adapter description.
///
/// Every known variant keeps the keys it does not model in `extra`, so a
/// decoded adapter encodes back to the same payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Adapter {
    BgzipFasta {
        fasta: Location,
        fai: Location,
        gzi: Location,
        extra: Map<String, Value>,
    },
    IndexedFasta {
        fasta: Location,
        fai: Location,
        extra: Map<String, Value>,
    },
    UnindexedFasta {
        fasta: Location,
        extra: Map<String, Value>,
    },
    ChromSizes {
        chrom_sizes: Location,
        extra: Map<String, Value>,
    },
    TwoBit {
        two_bit: Location,
        chrom_sizes: Option<Location>,
        extra: Map<String, Value>,
    },
    Gff3Tabix {
        gff_gz: Location,
        index: TabixIndex,
        extra: Map<String, Value>,
    },
    Gff3 {
        gff: Location,
        extra: Map<String, Value>,
    },
    VcfTabix {
        vcf_gz: Location,
        index: TabixIndex,
        extra: Map<String, Value>,
    },
    Sparql {
        endpoint: Location,
        query_template: String,
        ref_names_query_template: Option<String>,
        additional_query_params: Vec<String>,
        extra: Map<String, Value>,
    },
    RefNameAlias {
        location: Location,
        extra: Map<String, Value>,
    },
    TrixTextSearch {
        text_search_adapter_id: String,
        ix: Location,
        ixx: Location,
        meta: Option<Location>,
        assembly_names: Vec<String>,
        extra: Map<String, Value>,
    },
    /// An adapter type this core does not know. `fields` excludes `type`.
    Unknown {
        adapter_type: String,
        fields: Map<String, Value>,
    },
}

impl Adapter {
    /// The `type` tag.
    pub fn type_name(&self) -> &str {
        match self {
            Self::BgzipFasta { .. } => t::BGZIP_FASTA,
            Self::IndexedFasta { .. } => t::INDEXED_FASTA,
            Self::UnindexedFasta { .. } => t::UNINDEXED_FASTA,
            Self::ChromSizes { .. } => t::CHROM_SIZES,
            Self::TwoBit { .. } => t::TWO_BIT,
            Self::Gff3Tabix { .. } => t::GFF3_TABIX,
            Self::Gff3 { .. } => t::GFF3,
            Self::VcfTabix { .. } => t::VCF_TABIX,
            Self::Sparql { .. } => t::SPARQL,
            Self::RefNameAlias { .. } => t::REF_NAME_ALIAS,
            Self::TrixTextSearch { .. } => t::TRIX_TEXT_SEARCH,
            Self::Unknown { adapter_type, .. } => adapter_type,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown { .. })
    }

    /// Whether this adapter can back an assembly's reference sequence.
    pub fn is_sequence_adapter(&self) -> bool {
        matches!(
            self,
            Self::BgzipFasta { .. }
                | Self::IndexedFasta { .. }
                | Self::UnindexedFasta { .. }
                | Self::ChromSizes { .. }
                | Self::TwoBit { .. }
        )
    }

    /// Payload keys not modelled by the variant. For unknown adapters this
    /// is every field but `type`.
    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            Self::BgzipFasta { extra, .. }
            | Self::IndexedFasta { extra, .. }
            | Self::UnindexedFasta { extra, .. }
            | Self::ChromSizes { extra, .. }
            | Self::TwoBit { extra, .. }
            | Self::Gff3Tabix { extra, .. }
            | Self::Gff3 { extra, .. }
            | Self::VcfTabix { extra, .. }
            | Self::Sparql { extra, .. }
            | Self::RefNameAlias { extra, .. }
            | Self::TrixTextSearch { extra, .. } => extra,
            Self::Unknown { fields, .. } => fields,
        }
    }

    /// Every location of a known adapter, tagged with its field name.
    pub fn locations(&self) -> Vec<(&'static str, &Location)> {
        match self {
            Self::BgzipFasta { fasta, fai, gzi, .. } => vec![
                ("fastaLocation", fasta),
                ("faiLocation", fai),
                ("gziLocation", gzi),
            ],
            Self::IndexedFasta { fasta, fai, .. } => {
                vec![("fastaLocation", fasta), ("faiLocation", fai)]
            }
            Self::UnindexedFasta { fasta, .. } => vec![("fastaLocation", fasta)],
            Self::ChromSizes { chrom_sizes, .. } => vec![("chromSizesLocation", chrom_sizes)],
            Self::TwoBit {
                two_bit,
                chrom_sizes,
                ..
            } => {
                let mut out = vec![("twoBitLocation", two_bit)];
                if let Some(sizes) = chrom_sizes {
                    out.push(("chromSizesLocation", sizes));
                }
                out
            }
            Self::Gff3Tabix { gff_gz, index, .. } => {
                vec![("gffGzLocation", gff_gz), ("index", &index.location)]
            }
            Self::Gff3 { gff, .. } => vec![("gffLocation", gff)],
            Self::VcfTabix { vcf_gz, index, .. } => {
                vec![("vcfGzLocation", vcf_gz), ("index", &index.location)]
            }
            Self::Sparql { endpoint, .. } => vec![("endpoint", endpoint)],
            Self::RefNameAlias { location, .. } => vec![("location", location)],
            Self::TrixTextSearch { ix, ixx, meta, .. } => {
                let mut out = vec![("ixFilePath", ix), ("ixxFilePath", ixx)];
                if let Some(meta) = meta {
                    out.push(("metaFilePath", meta));
                }
                out
            }
            Self::Unknown { .. } => Vec::new(),
        }
    }

    /// Small index-like files the engine must read before the adapter is usable.
    pub fn index_locations(&self) -> Vec<(&'static str, &Location)> {
        match self {
            Self::BgzipFasta { fai, gzi, .. } => vec![("faiLocation", fai), ("gziLocation", gzi)],
            Self::IndexedFasta { fai, .. } => vec![("faiLocation", fai)],
            Self::ChromSizes { chrom_sizes, .. } => vec![("chromSizesLocation", chrom_sizes)],
            Self::TwoBit { two_bit, .. } => vec![("twoBitLocation", two_bit)],
            Self::RefNameAlias { location, .. } => vec![("location", location)],
            _ => Vec::new(),
        }
    }

    /// Decode and validate an adapter description.
    pub fn from_value(value: &Value) -> Result<Self, AdapterError> {
        let obj = value.as_object().ok_or(AdapterError::MissingType)?;
        let adapter_type = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(AdapterError::MissingType)?;
        let f = Fields::new(adapter_type, obj);

        let adapter = match adapter_type {
            t::BGZIP_FASTA => Self::BgzipFasta {
                fasta: f.location("fastaLocation")?,
                fai: f.location("faiLocation")?,
                gzi: f.location("gziLocation")?,
                extra: f.rest(),
            },
            t::INDEXED_FASTA => Self::IndexedFasta {
                fasta: f.location("fastaLocation")?,
                fai: f.location("faiLocation")?,
                extra: f.rest(),
            },
            t::UNINDEXED_FASTA => Self::UnindexedFasta {
                fasta: f.location("fastaLocation")?,
                extra: f.rest(),
            },
            t::CHROM_SIZES => Self::ChromSizes {
                chrom_sizes: f.location("chromSizesLocation")?,
                extra: f.rest(),
            },
            t::TWO_BIT => Self::TwoBit {
                two_bit: f.location("twoBitLocation")?,
                chrom_sizes: f.optional_location("chromSizesLocation")?,
                extra: f.rest(),
            },
            t::GFF3_TABIX => {
                let gff_gz = f.location_or_uri("gffGzLocation")?;
                let index = f.tabix_index(&gff_gz)?;
                Self::Gff3Tabix {
                    gff_gz,
                    index,
                    extra: f.rest(),
                }
            }
            t::GFF3 => Self::Gff3 {
                gff: f.location_or_uri("gffLocation")?,
                extra: f.rest(),
            },
            t::VCF_TABIX => {
                let vcf_gz = f.location_or_uri("vcfGzLocation")?;
                let index = f.tabix_index(&vcf_gz)?;
                Self::VcfTabix {
                    vcf_gz,
                    index,
                    extra: f.rest(),
                }
            }
            t::SPARQL => Self::Sparql {
                endpoint: f.location("endpoint")?,
                query_template: f.string("queryTemplate")?,
                ref_names_query_template: f.optional_string("refNamesQueryTemplate")?,
                additional_query_params: f.string_list("additionalQueryParams")?,
                extra: f.rest(),
            },
            t::REF_NAME_ALIAS => Self::RefNameAlias {
                location: f.location_or_uri("location")?,
                extra: f.rest(),
            },
            t::TRIX_TEXT_SEARCH => Self::TrixTextSearch {
                text_search_adapter_id: f.string("textSearchAdapterId")?,
                ix: f.location("ixFilePath")?,
                ixx: f.location("ixxFilePath")?,
                meta: f.optional_location("metaFilePath")?,
                assembly_names: f.string_list("assemblyNames")?,
                extra: f.rest(),
            },
            other => {
                check_nested_addresses("adapter", value)?;
                Self::Unknown {
                    adapter_type: other.to_string(),
                    fields: f.rest(),
                }
            }
        };
        if adapter.is_known() {
            check_nested_addresses("adapter", &Value::Object(adapter.extra().clone()))?;
        }
        Ok(adapter)
    }

    /// Encode back to the document form.
    pub fn to_value(&self) -> Value {
        let mut obj = self.extra().clone();
        obj.insert("type".to_string(), json!(self.type_name()));
        let mut put = |key: &str, value: Value| {
            obj.insert(key.to_string(), value);
        };

        match self {
            Self::Sparql {
                endpoint,
                query_template,
                ref_names_query_template,
                additional_query_params,
                ..
            } => {
                put("endpoint", endpoint.to_value());
                put("queryTemplate", json!(query_template));
                if let Some(tpl) = ref_names_query_template {
                    put("refNamesQueryTemplate", json!(tpl));
                }
                put("additionalQueryParams", json!(additional_query_params));
            }
            Self::TrixTextSearch {
                text_search_adapter_id,
                assembly_names,
                ..
            } => {
                put("textSearchAdapterId", json!(text_search_adapter_id));
                for (key, loc) in self.locations() {
                    put(key, loc.to_value());
                }
                put("assemblyNames", json!(assembly_names));
            }
            Self::Gff3Tabix {
                gff_gz: data,
                index,
                ..
            }
            | Self::VcfTabix {
                vcf_gz: data,
                index,
                ..
            } => {
                let key = if matches!(self, Self::Gff3Tabix { .. }) {
                    "gffGzLocation"
                } else {
                    "vcfGzLocation"
                };
                put(key, data.to_value());
                put("index", index.to_value());
            }
            Self::Unknown { .. } => {}
            _ => {
                for (key, loc) in self.locations() {
                    put(key, loc.to_value());
                }
            }
        }
        Value::Object(obj)
    }
}

impl Serialize for Adapter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Adapter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Field accessors that report failures against the adapter's type tag
/// and remember which keys were read.
struct Fields<'a> {
    adapter_type: &'a str,
    obj: &'a Map<String, Value>,
    used: RefCell<Vec<&'static str>>,
}

impl<'a> Fields<'a> {
    fn new(adapter_type: &'a str, obj: &'a Map<String, Value>) -> Self {
        Self {
            adapter_type,
            obj,
            used: RefCell::new(vec!["type"]),
        }
    }

    /// Keys nothing has read.
    fn rest(&self) -> Map<String, Value> {
        let used = self.used.borrow();
        self.obj
            .iter()
            .filter(|(k, _)| !used.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn missing(&self, field: &'static str) -> AdapterError {
        AdapterError::MissingField {
            adapter_type: self.adapter_type.to_string(),
            field,
        }
    }

    fn invalid(&self, field: &str, message: &str) -> AdapterError {
        AdapterError::InvalidField {
            adapter_type: self.adapter_type.to_string(),
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    fn present(&self, key: &'static str) -> Option<&'a Value> {
        self.used.borrow_mut().push(key);
        self.obj.get(key).filter(|v| !v.is_null())
    }

    fn location(&self, key: &'static str) -> Result<Location, AdapterError> {
        let value = self.present(key).ok_or_else(|| self.missing(key))?;
        Location::from_value(key, value)
    }

    fn optional_location(&self, key: &'static str) -> Result<Option<Location>, AdapterError> {
        self.present(key)
            .map(|value| Location::from_value(key, value))
            .transpose()
    }

    /// `key`, or the `uri` shorthand when `key` is absent.
    ///
    /// `uri` counts as read only when the shorthand is used.
    fn location_or_uri(&self, key: &'static str) -> Result<Location, AdapterError> {
        if let Some(value) = self.present(key) {
            return Location::from_value(key, value);
        }
        match self.present("uri") {
            Some(Value::String(uri)) => Location::from_value("uri", &json!(uri)),
            Some(_) => Err(self.invalid("uri", "expected a string")),
            None => Err(self.missing(key)),
        }
    }

    fn tabix_index(&self, data: &Location) -> Result<TabixIndex, AdapterError> {
        let Some(index) = self.present("index") else {
            return Ok(TabixIndex::beside(data));
        };
        let obj = index
            .as_object()
            .ok_or_else(|| self.invalid("index", "expected an object"))?;
        let index_type = match obj.get("indexType").and_then(Value::as_str) {
            None | Some("TBI") => IndexType::Tbi,
            Some("CSI") => IndexType::Csi,
            Some(other) => {
                return Err(self.invalid("index", &format!("unknown indexType `{}`", other)))
            }
        };
        let location = match obj.get("location") {
            Some(loc) => Location::from_value("index.location", loc)?,
            None => data.with_suffix(index_type.suffix()),
        };
        let extra = obj
            .iter()
            .filter(|(k, _)| k.as_str() != "location" && k.as_str() != "indexType")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(TabixIndex {
            location,
            index_type,
            extra,
        })
    }

    fn string(&self, key: &'static str) -> Result<String, AdapterError> {
        match self.present(key) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::String(_)) => Err(self.invalid(key, "must not be empty")),
            Some(_) => Err(self.invalid(key, "expected a string")),
            None => Err(self.missing(key)),
        }
    }

    fn optional_string(&self, key: &'static str) -> Result<Option<String>, AdapterError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(key, "expected a string")),
        }
    }

    fn string_list(&self, key: &'static str) -> Result<Vec<String>, AdapterError> {
        match self.present(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.invalid(key, "expected a list of strings"))
                })
                .collect(),
            Some(_) => Err(self.invalid(key, "expected a list of strings")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(u: &str) -> Value {
        json!({"uri": u, "locationType": "UriLocation"})
    }

    #[test]
    fn test_bgzip_fasta_requires_all_three_files() {
        let full = json!({
            "type": "BgzipFastaAdapter",
            "fastaLocation": uri("http://h/hg38.fa.gz"),
            "faiLocation": uri("http://h/hg38.fa.gz.fai"),
            "gziLocation": uri("http://h/hg38.fa.gz.gzi"),
        });
        let adapter = Adapter::from_value(&full).unwrap();
        assert!(adapter.is_sequence_adapter());
        assert_eq!(adapter.index_locations().len(), 2);
        assert_eq!(adapter.to_value(), full);

        let mut missing = full.clone();
        missing.as_object_mut().unwrap().remove("gziLocation");
        assert_eq!(
            Adapter::from_value(&missing).unwrap_err(),
            AdapterError::MissingField {
                adapter_type: "BgzipFastaAdapter".to_string(),
                field: "gziLocation",
            }
        );
    }

    #[test]
    fn test_tabix_uri_shorthand_expands_index() {
        let adapter = Adapter::from_value(&json!({
            "type": "Gff3TabixAdapter",
            "uri": "http://h/genes.sorted.gff.gz",
        }))
        .unwrap();
        match &adapter {
            Adapter::Gff3Tabix { gff_gz, index, .. } => {
                assert_eq!(gff_gz.address(), "http://h/genes.sorted.gff.gz");
                assert_eq!(index.location.address(), "http://h/genes.sorted.gff.gz.tbi");
                assert_eq!(index.index_type, IndexType::Tbi);
            }
            other => panic!("unexpected adapter {:?}", other),
        }
        let again = Adapter::from_value(&adapter.to_value()).unwrap();
        assert_eq!(again, adapter);
    }

    #[test]
    fn test_csi_index_default_location() {
        let adapter = Adapter::from_value(&json!({
            "type": "VcfTabixAdapter",
            "vcfGzLocation": uri("http://h/calls.vcf.gz"),
            "index": {"indexType": "CSI"},
        }))
        .unwrap();
        let Adapter::VcfTabix { index, .. } = adapter else {
            panic!("expected VcfTabix");
        };
        assert_eq!(index.index_type, IndexType::Csi);
        assert_eq!(index.location.address(), "http://h/calls.vcf.gz.csi");
    }

    #[test]
    fn test_sparql_adapter() {
        let value = json!({
            "type": "SPARQLAdapter",
            "endpoint": uri("http://localhost:8090/sparql"),
            "queryTemplate": "SELECT ?start WHERE { }",
            "additionalQueryParams": [],
        });
        let adapter = Adapter::from_value(&value).unwrap();
        assert_eq!(adapter.type_name(), "SPARQLAdapter");
        assert_eq!(adapter.to_value(), value);

        let mut no_template = value.clone();
        no_template.as_object_mut().unwrap().remove("queryTemplate");
        assert!(matches!(
            Adapter::from_value(&no_template),
            Err(AdapterError::MissingField { field: "queryTemplate", .. })
        ));
    }

    #[test]
    fn test_known_adapters_keep_unmodelled_keys() {
        let gff = json!({
            "type": "Gff3TabixAdapter",
            "gffGzLocation": uri("http://h/genes.gff.gz"),
            "index": {"location": uri("http://h/genes.gff.gz.tbi"), "indexType": "TBI"},
            "dontRedispatch": ["chromosome", "region"],
        });
        let adapter = Adapter::from_value(&gff).unwrap();
        assert_eq!(adapter.extra().get("dontRedispatch"), Some(&json!(["chromosome", "region"])));
        assert_eq!(adapter.to_value(), gff);

        let fasta = json!({
            "type": "IndexedFastaAdapter",
            "fastaLocation": {
                "uri": "http://h/a.fa",
                "locationType": "UriLocation",
                "internetAccountId": "acct-1",
            },
            "faiLocation": uri("http://h/a.fa.fai"),
            "metadataLocation": uri("http://h/a.meta.json"),
        });
        let adapter = Adapter::from_value(&fasta).unwrap();
        assert!(adapter.extra().contains_key("metadataLocation"));
        assert_eq!(adapter.to_value(), fasta);
        assert_eq!(Adapter::from_value(&adapter.to_value()).unwrap(), adapter);
    }

    #[test]
    fn test_unmodelled_locations_are_still_checked() {
        let value = json!({
            "type": "IndexedFastaAdapter",
            "fastaLocation": uri("http://h/a.fa"),
            "faiLocation": uri("http://h/a.fa.fai"),
            "metadataLocation": {"uri": "", "locationType": "UriLocation"},
        });
        assert!(matches!(
            Adapter::from_value(&value),
            Err(AdapterError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn test_unknown_adapter_passes_through() {
        let value = json!({
            "type": "BigWigAdapter",
            "bigWigLocation": uri("http://h/coverage.bw"),
            "source": "coverage",
        });
        let adapter = Adapter::from_value(&value).unwrap();
        assert!(!adapter.is_known());
        assert_eq!(adapter.type_name(), "BigWigAdapter");
        assert_eq!(adapter.to_value(), value);
    }

    #[test]
    fn test_unknown_adapter_still_checks_addresses() {
        let value = json!({
            "type": "BigWigAdapter",
            "bigWigLocation": {"uri": "", "locationType": "UriLocation"},
        });
        assert!(matches!(
            Adapter::from_value(&value),
            Err(AdapterError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn test_missing_type() {
        assert_eq!(
            Adapter::from_value(&json!({"uri": "http://h/x"})).unwrap_err(),
            AdapterError::MissingType
        );
        assert_eq!(
            Adapter::from_value(&json!("BgzipFastaAdapter")).unwrap_err(),
            AdapterError::MissingType
        );
    }
}
