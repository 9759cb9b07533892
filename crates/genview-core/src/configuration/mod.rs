//! Configuration Repository.
//!
//! Holds the static description of assemblies, tracks, text search adapters
//! and the default session. A [`Configuration`] is only obtained through
//! [`load`], which validates the whole document; once loaded it is treated
//! as immutable. Reconfiguring means loading a new one.
//!
//! ```rust,ignore
//! let config = genview_core::configuration::load_str(&std::fs::read_to_string("config.json")?)?;
//! for track in config.tracks_for_assembly("GRCh38") {
//!     println!("{} ({})", track.name, track.adapter.type_name());
//! }
//! ```

pub mod adapter;
pub mod assembly;
pub mod load;
pub mod location;
pub mod track;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::session::Session;

pub use adapter::{adapter_types, Adapter, IndexType, TabixIndex};
pub use assembly::{Assembly, RefNameAliases, SequenceTrack};
pub use load::{load, load_file, load_str};
pub use location::Location;
pub use track::{Track, TrackKind};

/// A validated configuration document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub assemblies: Vec<Assembly>,
    pub tracks: Vec<Track>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aggregate_text_search_adapters: Vec<Adapter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_session: Option<Session>,
    /// Top-level keys the core does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What a `configuration` reference in the session resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfiguredTrack<'a> {
    Track(&'a Track),
    /// The reference sequence track of an assembly.
    Sequence(&'a Assembly),
}

impl ConfiguredTrack<'_> {
    pub fn kind(&self) -> &TrackKind {
        match self {
            Self::Track(track) => &track.track_type,
            Self::Sequence(asm) => &asm.sequence.track_type,
        }
    }
}

/// A file the engine must be able to read before the view state is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredResource {
    /// Human-readable owner, e.g. `assembly hg38 faiLocation`.
    pub owner: String,
    pub location: Location,
}

impl Configuration {
    /// Look up an assembly by name or alias.
    pub fn assembly(&self, name: &str) -> Option<&Assembly> {
        self.assemblies.iter().find(|a| a.answers_to(name))
    }

    /// Look up a track by `trackId`.
    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }

    /// Tracks bound to the assembly `name` refers to (through any of its names).
    pub fn tracks_for_assembly(&self, name: &str) -> Vec<&Track> {
        let Some(assembly) = self.assembly(name) else {
            return Vec::new();
        };
        self.tracks
            .iter()
            .filter(|t| t.assembly_names.iter().any(|n| assembly.answers_to(n)))
            .collect()
    }

    pub fn tracks_in_category(&self, category: &str) -> Vec<&Track> {
        self.tracks.iter().filter(|t| t.in_category(category)).collect()
    }

    /// Resolve a `trackId`, including assembly sequence tracks.
    pub fn resolve_configuration(&self, track_id: &str) -> Option<ConfiguredTrack<'_>> {
        if let Some(track) = self.track(track_id) {
            return Some(ConfiguredTrack::Track(track));
        }
        self.assemblies
            .iter()
            .find(|a| a.sequence.track_id == track_id)
            .map(ConfiguredTrack::Sequence)
    }

    /// Index and alias files the engine reads while building its state.
    pub fn required_resources(&self) -> Vec<RequiredResource> {
        let mut out = Vec::new();
        for asm in &self.assemblies {
            for (field, location) in asm.sequence.adapter.index_locations() {
                out.push(RequiredResource {
                    owner: format!("assembly {} {}", asm.name, field),
                    location: location.clone(),
                });
            }
            if let Some(aliases) = &asm.ref_name_aliases {
                for (field, location) in aliases.adapter.index_locations() {
                    out.push(RequiredResource {
                        owner: format!("assembly {} refNameAliases {}", asm.name, field),
                        location: location.clone(),
                    });
                }
            }
        }
        out
    }

    /// Encode back to the document form.
    pub fn to_value(&self) -> Value {
        // Every field serializes through infallible `Value` conversions.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
