//! Error taxonomy for the genview core.
//!
//! Each boundary of the core has its own error type:
//! - [`ConfigError`] - malformed or inconsistent configuration, fatal to startup
//! - [`ConstructionError`] - the asynchronous view-state build failed
//! - [`HandlerError`] - a plugin's extension handler faulted (recovered by the dispatcher)
//! - [`FetchError`] - a detail provider request failed (rendered as a fallback)

use thiserror::Error;

/// Errors raised while validating an adapter description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The adapter object has no string `type` tag.
    #[error("adapter has no `type` tag")]
    MissingType,

    /// A field required by the adapter's type tag is absent.
    #[error("{adapter_type} requires field `{field}`")]
    MissingField {
        adapter_type: String,
        field: &'static str,
    },

    /// A location descriptor is not a well-formed address.
    #[error("invalid location in `{field}`: {reason}")]
    InvalidLocation { field: String, reason: String },

    /// A field is present but has the wrong shape.
    #[error("{adapter_type} field `{field}`: {message}")]
    InvalidField {
        adapter_type: String,
        field: String,
        message: String,
    },
}

/// Malformed or inconsistent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The raw document could not be parsed as JSON.
    #[error("configuration is not valid JSON: {0}")]
    Parse(String),

    /// The document root is not a JSON object.
    #[error("configuration root must be an object")]
    NotAnObject,

    /// A required top-level section is absent.
    #[error("missing top-level section `{0}`")]
    MissingSection(&'static str),

    /// A top-level section has the wrong shape.
    #[error("section `{section}` must be {expected}")]
    InvalidSection {
        section: &'static str,
        expected: &'static str,
    },

    /// An entry of a section could not be decoded.
    #[error("{section}[{index}]: {message}")]
    Malformed {
        section: &'static str,
        index: usize,
        message: String,
    },

    /// Two assemblies share a name or alias.
    #[error("assembly name or alias `{0}` is declared more than once")]
    DuplicateAssembly(String),

    /// Two tracks share a `trackId`.
    #[error("trackId `{0}` is declared more than once")]
    DuplicateTrackId(String),

    /// A track (or text search adapter) names an assembly that does not exist.
    #[error("{owner} refers to unknown assembly `{assembly}`")]
    UnknownAssembly { owner: String, assembly: String },

    /// An adapter failed validation.
    #[error("{owner}: {source}")]
    Adapter {
        owner: String,
        #[source]
        source: AdapterError,
    },

    /// A session node refers to an identifier that does not resolve.
    #[error("session {kind} `{from}` refers to missing `{to}`")]
    DanglingReference {
        kind: &'static str,
        from: String,
        to: String,
    },

    /// A session identifier is used by more than one node.
    #[error("session identifier `{0}` is used more than once")]
    DuplicateNodeId(String),

    /// Two text search adapters share an id.
    #[error("textSearchAdapterId `{0}` is declared more than once")]
    DuplicateTextSearchAdapter(String),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(String),
}

/// The asynchronous view-state construction failed or was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A remote resource required by the configuration could not be resolved.
    #[error("failed to resolve {owner} ({uri}): {reason}")]
    Resolution {
        owner: String,
        uri: String,
        reason: String,
    },

    /// A later construction started before this one settled.
    #[error("construction superseded by a newer request")]
    Superseded,

    /// The gate was torn down while the construction was pending.
    #[error("construction abandoned by teardown")]
    TornDown,

    /// The caller dropped the construction before it settled.
    #[error("construction cancelled before it settled")]
    Cancelled,

    /// The engine refused the configuration.
    #[error("engine error: {0}")]
    Engine(String),
}

/// A plugin's extension handler faulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Failed(String),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// A detail provider request failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The response envelope lacks an expected field.
    #[error("response is missing `{0}`")]
    MissingField(String),

    /// The remote service reported errors in its envelope.
    #[error("remote error: {0}")]
    Remote(String),

    /// The feature carries nothing to key a request on.
    #[error("feature has no usable identifier")]
    NoRequestKey,
}

/// Umbrella error for callers that cross several boundaries.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
