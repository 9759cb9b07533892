//! Opaque location descriptors.
//!
//! The core never dereferences a location; it only checks that the address
//! is well formed and hands it to the engine.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::AdapterError;

pub const URI_LOCATION: &str = "UriLocation";
pub const LOCAL_PATH_LOCATION: &str = "LocalPathLocation";

/// Where the engine should fetch a file from.
///
/// Keys the core does not model (`internetAccountId`, ...) are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `{uri, locationType: "UriLocation", baseUri?}`
    Uri {
        uri: String,
        base_uri: Option<String>,
        extra: Map<String, Value>,
    },
    /// `{localPath, locationType: "LocalPathLocation"}`
    LocalPath {
        local_path: String,
        extra: Map<String, Value>,
    },
}

impl Location {
    /// Create a plain URI location.
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri {
            uri: uri.into(),
            base_uri: None,
            extra: Map::new(),
        }
    }

    /// Create a local path location.
    pub fn local_path(path: impl Into<String>) -> Self {
        Self::LocalPath {
            local_path: path.into(),
            extra: Map::new(),
        }
    }

    /// The raw address string.
    pub fn address(&self) -> &str {
        match self {
            Self::Uri { uri, .. } => uri,
            Self::LocalPath { local_path, .. } => local_path,
        }
    }

    /// Unmodelled keys carried through from the document.
    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            Self::Uri { extra, .. } | Self::LocalPath { extra, .. } => extra,
        }
    }

    /// The address with `baseUri` applied to relative URIs.
    pub fn resolved(&self) -> String {
        match self {
            Self::Uri {
                uri,
                base_uri: Some(base),
                ..
            } if !uri.contains("://") => {
                // baseUri names a file; relative URIs resolve against its directory
                let scheme_end = base.find("://").map(|i| i + 3).unwrap_or(0);
                let dir = match base[scheme_end..].rfind('/') {
                    Some(idx) => &base[..scheme_end + idx],
                    None => base.as_str(),
                };
                format!("{}/{}", dir, uri.trim_start_matches("./"))
            }
            _ => self.address().to_string(),
        }
    }

    /// A sibling location with `suffix` appended to the address (`x.gz` -> `x.gz.tbi`).
    pub fn with_suffix(&self, suffix: &str) -> Self {
        match self {
            Self::Uri {
                uri,
                base_uri,
                extra,
            } => Self::Uri {
                uri: format!("{}{}", uri, suffix),
                base_uri: base_uri.clone(),
                extra: extra.clone(),
            },
            Self::LocalPath { local_path, extra } => Self::LocalPath {
                local_path: format!("{}{}", local_path, suffix),
                extra: extra.clone(),
            },
        }
    }

    /// Decode a location descriptor found under `field`.
    ///
    /// A bare string is accepted as a URI. An object without `locationType`
    /// is a URI location when it has a `uri` key.
    pub fn from_value(field: &str, value: &Value) -> Result<Self, AdapterError> {
        let invalid = |reason: &str| AdapterError::InvalidLocation {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let obj = match value {
            Value::String(s) => {
                check_address(field, s)?;
                return Ok(Self::uri(s.clone()));
            }
            Value::Object(obj) => obj,
            _ => return Err(invalid("expected an object or a string")),
        };

        let kind = match obj.get("locationType") {
            None => {
                if obj.contains_key("localPath") && !obj.contains_key("uri") {
                    LOCAL_PATH_LOCATION
                } else {
                    URI_LOCATION
                }
            }
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return Err(invalid("`locationType` must be a string")),
        };

        match kind {
            URI_LOCATION => {
                let uri = string_field(obj, "uri").ok_or_else(|| invalid("missing `uri`"))?;
                check_address(field, uri)?;
                let base_uri = match obj.get("baseUri") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => {
                        check_address(field, s)?;
                        Some(s.clone())
                    }
                    Some(_) => return Err(invalid("`baseUri` must be a string")),
                };
                Ok(Self::Uri {
                    uri: uri.to_string(),
                    base_uri,
                    extra: unmodelled(obj, &["uri", "baseUri"]),
                })
            }
            LOCAL_PATH_LOCATION => {
                let path =
                    string_field(obj, "localPath").ok_or_else(|| invalid("missing `localPath`"))?;
                check_address(field, path)?;
                Ok(Self::LocalPath {
                    local_path: path.to_string(),
                    extra: unmodelled(obj, &["localPath"]),
                })
            }
            other => Err(invalid(&format!("unsupported locationType `{}`", other))),
        }
    }

    /// Encode back to the document form.
    pub fn to_value(&self) -> Value {
        let mut obj = self.extra().clone();
        match self {
            Self::Uri { uri, base_uri, .. } => {
                obj.insert("uri".to_string(), json!(uri));
                if let Some(base) = base_uri {
                    obj.insert("baseUri".to_string(), json!(base));
                }
                obj.insert("locationType".to_string(), json!(URI_LOCATION));
            }
            Self::LocalPath { local_path, .. } => {
                obj.insert("localPath".to_string(), json!(local_path));
                obj.insert("locationType".to_string(), json!(LOCAL_PATH_LOCATION));
            }
        }
        Value::Object(obj)
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Uri { .. })
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resolved())
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value("location", &value).map_err(serde::de::Error::custom)
    }
}

/// Check that an address is well formed: non-empty, no whitespace or control characters.
pub fn check_address(field: &str, address: &str) -> Result<(), AdapterError> {
    let reason = if address.is_empty() {
        Some("address is empty")
    } else if address.chars().any(char::is_whitespace) {
        Some("address contains whitespace")
    } else if address.chars().any(char::is_control) {
        Some("address contains control characters")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(AdapterError::InvalidLocation {
            field: field.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Walk an arbitrary JSON payload and check every nested `{uri}` / `{localPath}` descriptor.
pub fn check_nested_addresses(path: &str, value: &Value) -> Result<(), AdapterError> {
    match value {
        Value::Object(obj) => {
            if obj.contains_key("uri") || obj.contains_key("locationType") {
                Location::from_value(path, value)?;
            }
            for (key, child) in obj {
                if key == "uri" || key == "baseUri" || key == "localPath" || key == "locationType" {
                    continue;
                }
                check_nested_addresses(&format!("{}.{}", path, key), child)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                check_nested_addresses(&format!("{}[{}]", path, i), child)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Keys of `obj` other than `locationType` and `modelled`.
fn unmodelled(obj: &Map<String, Value>, modelled: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, _)| k.as_str() != "locationType" && !modelled.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn string_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}
