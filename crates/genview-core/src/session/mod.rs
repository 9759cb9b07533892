//! Persisted session tree: views, their tracks and displays, drawer widgets.
//!
//! Children point at parents and siblings only through [`NodeId`] strings,
//! resolved by lookup. The tree is plain data and round-trips through JSON.

pub mod id;
pub mod widget;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::configuration::{Track, TrackKind};
use crate::error::ConfigError;

pub use id::NodeId;
pub use widget::{Widget, WidgetKind};

pub const LINEAR_GENOME_VIEW: &str = "LinearGenomeView";

/// Which side the widget drawer is docked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawerPosition {
    Left,
    #[default]
    Right,
}

/// A contiguous stretch of a reference sequence shown in a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub ref_name: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub reversed: bool,
    pub assembly_name: String,
}

/// One display of a track inside a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub display_type: String,
    /// Display configuration id, conventionally `{trackId}-{type}`.
    pub configuration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_pre_config: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A track opened in a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTrack {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub track_type: TrackKind,
    /// The `trackId` of the configured track.
    pub configuration: String,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub displays: Vec<Display>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An open view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub view_type: String,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp_per_px: Option<f64>,
    #[serde(default)]
    pub displayed_regions: Vec<Region>,
    #[serde(default)]
    pub tracks: Vec<SessionTrack>,
    /// View settings the core does not model (header, gridlines, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl View {
    /// An empty linear genome view with a fresh id.
    pub fn linear_genome_view() -> Self {
        Self {
            id: NodeId::generate(),
            view_type: LINEAR_GENOME_VIEW.to_string(),
            minimized: false,
            offset_px: None,
            bp_per_px: None,
            displayed_regions: Vec::new(),
            tracks: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.displayed_regions.push(region);
        self
    }

    /// The open track showing configured track `track_id`.
    pub fn track(&self, track_id: &str) -> Option<&SessionTrack> {
        self.tracks.iter().find(|t| t.configuration == track_id)
    }

    /// Open `track` with its default display. Returns the session track id;
    /// an already open track is left as is.
    pub fn show_track(&mut self, track: &Track) -> NodeId {
        if let Some(existing) = self.track(&track.track_id) {
            return existing.id.clone();
        }
        let display_type = track.track_type.default_display_type().to_string();
        let session_track = SessionTrack {
            id: NodeId::generate(),
            track_type: track.track_type.clone(),
            configuration: track.track_id.clone(),
            minimized: false,
            pinned: false,
            displays: vec![Display {
                id: NodeId::generate(),
                configuration: track.display_configuration(&display_type),
                display_type,
                height_pre_config: None,
                extra: Map::new(),
            }],
            extra: Map::new(),
        };
        let id = session_track.id.clone();
        self.tracks.push(session_track);
        id
    }

    /// Close the track showing `track_id`. Returns whether one was open.
    pub fn hide_track(&mut self, track_id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.configuration != track_id);
        self.tracks.len() != before
    }
}

/// The persisted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub margin: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawer_position: Option<DrawerPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawer_width: Option<u32>,
    #[serde(default)]
    pub widgets: BTreeMap<String, Widget>,
    /// Widget key -> widget id of the widgets currently shown.
    #[serde(default)]
    pub active_widgets: BTreeMap<String, NodeId>,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub views: Vec<View>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused_view_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky_view_headers: Option<bool>,
    #[serde(default)]
    pub session_tracks: Vec<Value>,
    #[serde(default)]
    pub session_assemblies: Vec<Value>,
    #[serde(default)]
    pub temporary_assemblies: Vec<Value>,
    #[serde(default)]
    pub connection_instances: Vec<Value>,
    #[serde(default)]
    pub session_connections: Vec<Value>,
    #[serde(default)]
    pub session_plugins: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// An empty session with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            name: name.into(),
            margin: 0,
            drawer_position: None,
            drawer_width: None,
            widgets: BTreeMap::new(),
            active_widgets: BTreeMap::new(),
            minimized: false,
            views: Vec::new(),
            focused_view_id: None,
            sticky_view_headers: None,
            session_tracks: Vec::new(),
            session_assemblies: Vec::new(),
            temporary_assemblies: Vec::new(),
            connection_instances: Vec::new(),
            session_connections: Vec::new(),
            session_plugins: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Add a view and focus it. Returns its id.
    pub fn add_view(&mut self, view: View) -> NodeId {
        let id = view.id.clone();
        self.views.push(view);
        self.focused_view_id = Some(id.clone());
        id
    }

    pub fn view(&self, id: &NodeId) -> Option<&View> {
        self.views.iter().find(|v| &v.id == id)
    }

    pub fn view_mut(&mut self, id: &NodeId) -> Option<&mut View> {
        self.views.iter_mut().find(|v| &v.id == id)
    }

    pub fn focused_view(&self) -> Option<&View> {
        self.focused_view_id.as_ref().and_then(|id| self.view(id))
    }

    /// Resolve the view a widget is attached to.
    pub fn widget_view(&self, widget_key: &str) -> Option<&View> {
        self.widgets
            .get(widget_key)
            .and_then(Widget::view_id)
            .and_then(|id| self.view(id))
    }

    /// Widgets currently shown in the drawer.
    pub fn active(&self) -> impl Iterator<Item = &Widget> {
        self.active_widgets
            .values()
            .filter_map(|id| self.widgets.values().find(|w| &w.id == id))
    }

    /// `trackId`s of the tracks declared by the session itself.
    pub fn session_track_ids(&self) -> impl Iterator<Item = &str> {
        self.session_tracks
            .iter()
            .filter_map(|t| t.get("trackId").and_then(Value::as_str))
    }

    /// Names and aliases of session-local and temporary assemblies.
    pub fn session_assembly_names(&self) -> impl Iterator<Item = &str> {
        self.session_assemblies
            .iter()
            .chain(&self.temporary_assemblies)
            .flat_map(|asm| {
                let name = asm.get("name").and_then(Value::as_str);
                let aliases = asm
                    .get("aliases")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(Value::as_str);
                name.into_iter().chain(aliases)
            })
    }

    /// Check that every identifier reference inside the tree resolves.
    ///
    /// `track_exists` answers whether a configured trackId exists and
    /// `assembly_exists` whether an assembly name or alias exists. Tracks
    /// and assemblies the session declares itself also resolve.
    pub fn validate_references(
        &self,
        track_exists: impl Fn(&str) -> bool,
        assembly_exists: impl Fn(&str) -> bool,
    ) -> Result<(), ConfigError> {
        let local_tracks: HashSet<&str> = self.session_track_ids().collect();
        let local_assemblies: HashSet<&str> = self.session_assembly_names().collect();
        let track_exists = |id: &str| local_tracks.contains(id) || track_exists(id);
        let assembly_exists =
            |name: &str| local_assemblies.contains(name) || assembly_exists(name);

        let mut seen = HashSet::new();
        let mut claim = |id: &NodeId| {
            if seen.insert(id.as_str().to_string()) {
                Ok(())
            } else {
                Err(ConfigError::DuplicateNodeId(id.to_string()))
            }
        };

        for view in &self.views {
            claim(&view.id)?;
            for region in &view.displayed_regions {
                if !assembly_exists(&region.assembly_name) {
                    return Err(ConfigError::DanglingReference {
                        kind: "displayed region",
                        from: view.id.to_string(),
                        to: region.assembly_name.clone(),
                    });
                }
            }
            for track in &view.tracks {
                claim(&track.id)?;
                if !track_exists(&track.configuration) {
                    return Err(ConfigError::DanglingReference {
                        kind: "track",
                        from: track.id.to_string(),
                        to: track.configuration.clone(),
                    });
                }
                for display in &track.displays {
                    claim(&display.id)?;
                }
            }
        }

        for (key, widget) in &self.widgets {
            if let Some(view_id) = widget.view_id() {
                if self.view(view_id).is_none() {
                    return Err(ConfigError::DanglingReference {
                        kind: "widget",
                        from: key.clone(),
                        to: view_id.to_string(),
                    });
                }
            }
        }

        for (key, widget_id) in &self.active_widgets {
            if !self.widgets.values().any(|w| &w.id == widget_id) {
                return Err(ConfigError::DanglingReference {
                    kind: "active widget",
                    from: key.clone(),
                    to: widget_id.to_string(),
                });
            }
        }

        if let Some(focused) = &self.focused_view_id {
            if self.view(focused).is_none() {
                return Err(ConfigError::DanglingReference {
                    kind: "focused view",
                    from: self.id.to_string(),
                    to: focused.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{Adapter, Location};
    use serde_json::json;

    fn genes_track() -> Track {
        Track::new(
            TrackKind::Feature,
            "ncbi_genes",
            "NCBI RefSeq Genes",
            vec!["hg38".to_string()],
            Adapter::Gff3 {
                gff: Location::uri("http://h/genes.gff3"),
                extra: Default::default(),
            },
        )
    }

    #[test]
    fn test_show_and_hide_track() {
        let mut view = View::linear_genome_view();
        let id = view.show_track(&genes_track());
        assert_eq!(view.show_track(&genes_track()), id);
        assert_eq!(view.tracks.len(), 1);

        let opened = view.track("ncbi_genes").unwrap();
        assert_eq!(opened.displays[0].display_type, "LinearBasicDisplay");
        assert_eq!(
            opened.displays[0].configuration,
            "ncbi_genes-LinearBasicDisplay"
        );

        assert!(view.hide_track("ncbi_genes"));
        assert!(!view.hide_track("ncbi_genes"));
    }

    #[test]
    fn test_widget_view_lookup() {
        let mut session = Session::new("NewSession");
        let view_id = session.add_view(View::linear_genome_view());
        session.widgets.insert(
            "hierarchicalTrackSelector".to_string(),
            Widget::new(
                "hierarchicalTrackSelector",
                WidgetKind::HierarchicalTrackSelector {
                    view: Some(view_id.clone()),
                    faceted: None,
                },
            ),
        );
        session.active_widgets.insert(
            "hierarchicalTrackSelector".to_string(),
            NodeId::from("hierarchicalTrackSelector"),
        );

        assert_eq!(
            session.widget_view("hierarchicalTrackSelector").map(|v| &v.id),
            Some(&view_id)
        );
        assert_eq!(session.active().count(), 1);
        assert_eq!(session.focused_view().map(|v| &v.id), Some(&view_id));
        assert!(session.validate_references(|_| true, |_| true).is_ok());
    }

    #[test]
    fn test_dangling_references() {
        let mut session = Session::new("s");
        let mut view = View::linear_genome_view();
        view.show_track(&genes_track());
        session.add_view(view);

        let err = session
            .validate_references(|id| id != "ncbi_genes", |_| true)
            .unwrap_err();
        assert!(matches!(err, ConfigError::DanglingReference { kind: "track", .. }));

        session.focused_view_id = Some(NodeId::from("gone"));
        let err = session.validate_references(|_| true, |_| true).unwrap_err();
        assert!(matches!(err, ConfigError::DanglingReference { kind: "focused view", .. }));
    }

    #[test]
    fn test_session_local_tracks_and_assemblies_resolve() {
        let upload = Track::new(
            TrackKind::Feature,
            "my_upload",
            "My upload",
            vec!["my_contigs".to_string()],
            Adapter::Gff3 {
                gff: Location::uri("http://h/upload.gff3"),
                extra: Default::default(),
            },
        );
        let mut session = Session::new("s");
        let mut view = View::linear_genome_view().with_region(Region {
            ref_name: "ctg1".to_string(),
            start: 0,
            end: 5000,
            reversed: false,
            assembly_name: "contigs".to_string(),
        });
        view.show_track(&upload);
        session.add_view(view);

        let err = session.validate_references(|_| false, |_| false).unwrap_err();
        assert!(matches!(err, ConfigError::DanglingReference { kind: "displayed region", .. }));

        session.temporary_assemblies.push(json!({"name": "my_contigs", "aliases": ["contigs"]}));
        let err = session.validate_references(|_| false, |_| false).unwrap_err();
        assert!(matches!(err, ConfigError::DanglingReference { kind: "track", .. }));

        session.session_tracks.push(serde_json::to_value(&upload).unwrap());
        assert!(session.validate_references(|_| false, |_| false).is_ok());
        assert_eq!(session.session_track_ids().collect::<Vec<_>>(), vec!["my_upload"]);
    }

    #[test]
    fn test_duplicate_node_ids() {
        let mut session = Session::new("s");
        let view = View::linear_genome_view();
        session.views.push(view.clone());
        session.views.push(view);
        assert!(matches!(
            session.validate_references(|_| true, |_| true),
            Err(ConfigError::DuplicateNodeId(_))
        ));
    }

    #[test]
    fn test_session_keeps_view_settings() {
        let value = json!({
            "id": "XoH3lXVcjuXCbqrJfnxjs",
            "name": "NewSession",
            "views": [{
                "id": "v1",
                "type": "LinearGenomeView",
                "offsetPx": 1161591458.0,
                "bpPerPx": 0.02,
                "displayedRegions": [{"refName": "1", "start": 0, "end": 248956422, "reversed": false, "assemblyName": "hg38"}],
                "tracks": [],
                "showGridlines": true
            }],
            "stickyViewHeaders": true
        });
        let session: Session = serde_json::from_value(value).unwrap();
        assert_eq!(session.views[0].extra.get("showGridlines"), Some(&json!(true)));
        assert_eq!(session.views[0].displayed_regions[0].end, 248_956_422);

        let again: Session =
            serde_json::from_value(serde_json::to_value(&session).unwrap()).unwrap();
        assert_eq!(again, session);
    }
}
