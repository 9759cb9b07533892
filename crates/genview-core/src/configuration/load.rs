//! Loading and validating configuration documents.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::adapter::Adapter;
use super::{Assembly, Configuration, Track};
use crate::error::{AdapterError, ConfigError};
use crate::session::Session;

const ASSEMBLIES: &str = "assemblies";
const TRACKS: &str = "tracks";
const TEXT_SEARCH: &str = "aggregateTextSearchAdapters";
const DEFAULT_SESSION: &str = "defaultSession";

/// Validate a raw document and build a [`Configuration`].
///
/// No I/O happens here: locations are checked for shape only. The whole
/// document is rejected on the first inconsistency.
pub fn load(raw: &Value) -> Result<Configuration, ConfigError> {
    let obj = raw.as_object().ok_or(ConfigError::NotAnObject)?;

    let assemblies = section(obj, ASSEMBLIES)?
        .iter()
        .enumerate()
        .map(|(i, v)| decode_assembly(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    let tracks = section(obj, TRACKS)?
        .iter()
        .enumerate()
        .map(|(i, v)| decode_track(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    let aggregate_text_search_adapters = match obj.get(TEXT_SEARCH) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Adapter::from_value(v).map_err(|source| ConfigError::Adapter {
                    owner: format!("{}[{}]", TEXT_SEARCH, i),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ConfigError::InvalidSection {
                section: TEXT_SEARCH,
                expected: "a list",
            })
        }
    };

    let default_session = match obj.get(DEFAULT_SESSION) {
        None | Some(Value::Null) => None,
        Some(v) => Some(decode::<Session>(DEFAULT_SESSION, 0, v)?),
    };

    let extra: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| ![ASSEMBLIES, TRACKS, TEXT_SEARCH, DEFAULT_SESSION].contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let config = Configuration {
        assemblies,
        tracks,
        aggregate_text_search_adapters,
        default_session,
        extra,
    };
    validate(&config)?;

    tracing::debug!(
        assemblies = config.assemblies.len(),
        tracks = config.tracks.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Parse JSON text, then [`load`] it.
pub fn load_str(text: &str) -> Result<Configuration, ConfigError> {
    let raw: Value = serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    load(&raw)
}

/// Read a JSON file, then [`load`] it.
pub fn load_file(path: impl AsRef<Path>) -> Result<Configuration, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    load_str(&text)
}

fn section<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a Vec<Value>, ConfigError> {
    match obj.get(name) {
        None | Some(Value::Null) => Err(ConfigError::MissingSection(name)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ConfigError::InvalidSection {
            section: name,
            expected: "a list",
        }),
    }
}

fn decode<T: DeserializeOwned>(section: &'static str, index: usize, value: &Value) -> Result<T, ConfigError> {
    serde_json::from_value(value.clone()).map_err(|e| ConfigError::Malformed {
        section,
        index,
        message: e.to_string(),
    })
}

/// Check an embedded adapter first so its failure is reported with its owner.
fn check_adapter(owner: impl FnOnce() -> String, value: Option<&Value>) -> Result<(), ConfigError> {
    match value {
        Some(adapter) => Adapter::from_value(adapter).map(|_| ()).map_err(|source| {
            ConfigError::Adapter {
                owner: owner(),
                source,
            }
        }),
        None => Ok(()),
    }
}

fn label(value: &Value, key: &str, index: usize) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index))
}

fn decode_assembly(index: usize, value: &Value) -> Result<Assembly, ConfigError> {
    let name = label(value, "name", index);
    check_adapter(
        || format!("assembly `{}` sequence", name),
        value.pointer("/sequence/adapter"),
    )?;
    check_adapter(
        || format!("assembly `{}` refNameAliases", name),
        value.pointer("/refNameAliases/adapter"),
    )?;
    decode(ASSEMBLIES, index, value)
}

fn decode_track(index: usize, value: &Value) -> Result<Track, ConfigError> {
    let track_id = label(value, "trackId", index);
    check_adapter(|| format!("track `{}`", track_id), value.get("adapter"))?;
    decode(TRACKS, index, value)
}

fn validate(config: &Configuration) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    for asm in &config.assemblies {
        for name in asm.all_names() {
            if !names.insert(name) {
                return Err(ConfigError::DuplicateAssembly(name.to_string()));
            }
        }
        let adapter = &asm.sequence.adapter;
        if adapter.is_known() && !adapter.is_sequence_adapter() {
            return Err(ConfigError::Adapter {
                owner: format!("assembly `{}` sequence", asm.name),
                source: AdapterError::InvalidField {
                    adapter_type: adapter.type_name().to_string(),
                    field: "type".to_string(),
                    message: "not a sequence adapter".to_string(),
                },
            });
        }
    }

    let mut track_ids = HashSet::new();
    for id in config
        .assemblies
        .iter()
        .map(|a| a.sequence.track_id.as_str())
        .chain(config.tracks.iter().map(|t| t.track_id.as_str()))
    {
        if !track_ids.insert(id) {
            return Err(ConfigError::DuplicateTrackId(id.to_string()));
        }
    }

    for (index, track) in config.tracks.iter().enumerate() {
        if track.assembly_names.is_empty() {
            return Err(ConfigError::Malformed {
                section: TRACKS,
                index,
                message: format!("track `{}` has no assemblyNames", track.track_id),
            });
        }
        for assembly in &track.assembly_names {
            if !names.contains(assembly.as_str()) {
                return Err(ConfigError::UnknownAssembly {
                    owner: format!("track `{}`", track.track_id),
                    assembly: assembly.clone(),
                });
            }
        }
    }

    let mut search_ids = HashSet::new();
    for adapter in &config.aggregate_text_search_adapters {
        if let Adapter::TrixTextSearch {
            text_search_adapter_id,
            assembly_names,
            ..
        } = adapter
        {
            if !search_ids.insert(text_search_adapter_id.as_str()) {
                return Err(ConfigError::DuplicateTextSearchAdapter(
                    text_search_adapter_id.clone(),
                ));
            }
            for assembly in assembly_names {
                if !names.contains(assembly.as_str()) {
                    return Err(ConfigError::UnknownAssembly {
                        owner: format!("text search adapter `{}`", text_search_adapter_id),
                        assembly: assembly.clone(),
                    });
                }
            }
        }
    }

    if let Some(session) = &config.default_session {
        session.validate_references(
            |id| track_ids.contains(id),
            |name| names.contains(name),
        )?;
    }

    Ok(())
}
