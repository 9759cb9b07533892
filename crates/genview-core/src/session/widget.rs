//! Drawer widgets of a session.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::id::NodeId;

pub const GRID_BOOKMARK: &str = "GridBookmarkWidget";
pub const HIERARCHICAL_TRACK_SELECTOR: &str = "HierarchicalTrackSelectorWidget";
pub const BASE_FEATURE: &str = "BaseFeatureWidget";

/// What a widget is, with the fields the core understands for that kind.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    GridBookmark,
    HierarchicalTrackSelector {
        view: Option<NodeId>,
        faceted: Option<Value>,
    },
    BaseFeature {
        view: Option<NodeId>,
        track: Option<NodeId>,
        feature: Option<Value>,
    },
    /// Any widget type this core does not model.
    Unknown(String),
}

/// A widget in the session drawer.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: NodeId,
    pub kind: WidgetKind,
    /// Remaining fields, carried through untouched.
    pub extra: Map<String, Value>,
}

impl Widget {
    pub fn new(id: impl Into<NodeId>, kind: WidgetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            extra: Map::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        match &self.kind {
            WidgetKind::GridBookmark => GRID_BOOKMARK,
            WidgetKind::HierarchicalTrackSelector { .. } => HIERARCHICAL_TRACK_SELECTOR,
            WidgetKind::BaseFeature { .. } => BASE_FEATURE,
            WidgetKind::Unknown(t) => t,
        }
    }

    /// The view this widget is attached to, if any.
    pub fn view_id(&self) -> Option<&NodeId> {
        match &self.kind {
            WidgetKind::HierarchicalTrackSelector { view, .. } => view.as_ref(),
            WidgetKind::BaseFeature { view, .. } => view.as_ref(),
            _ => None,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, String> {
        let mut obj = value
            .as_object()
            .cloned()
            .ok_or_else(|| "widget must be an object".to_string())?;
        let id = match obj.remove("id") {
            Some(Value::String(id)) => NodeId(id),
            _ => return Err("widget has no string `id`".to_string()),
        };
        let widget_type = match obj.remove("type") {
            Some(Value::String(t)) => t,
            _ => return Err(format!("widget `{}` has no string `type`", id)),
        };

        let mut take_id = |key: &str| -> Result<Option<NodeId>, String> {
            match obj.remove(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(NodeId(s))),
                Some(_) => Err(format!("widget `{}` field `{}` must be a string", id, key)),
            }
        };

        let kind = match widget_type.as_str() {
            GRID_BOOKMARK => WidgetKind::GridBookmark,
            HIERARCHICAL_TRACK_SELECTOR => {
                let view = take_id("view")?;
                WidgetKind::HierarchicalTrackSelector {
                    view,
                    faceted: obj.remove("faceted"),
                }
            }
            BASE_FEATURE => {
                let view = take_id("view")?;
                let track = take_id("track")?;
                WidgetKind::BaseFeature {
                    view,
                    track,
                    feature: obj.remove("featureData"),
                }
            }
            _ => WidgetKind::Unknown(widget_type),
        };

        Ok(Self {
            id,
            kind,
            extra: obj,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut obj = self.extra.clone();
        obj.insert("id".to_string(), json!(self.id));
        obj.insert("type".to_string(), json!(self.type_name()));
        match &self.kind {
            WidgetKind::HierarchicalTrackSelector { view, faceted } => {
                if let Some(view) = view {
                    obj.insert("view".to_string(), json!(view));
                }
                if let Some(faceted) = faceted {
                    obj.insert("faceted".to_string(), faceted.clone());
                }
            }
            WidgetKind::BaseFeature {
                view,
                track,
                feature,
            } => {
                if let Some(view) = view {
                    obj.insert("view".to_string(), json!(view));
                }
                if let Some(track) = track {
                    obj.insert("track".to_string(), json!(track));
                }
                if let Some(feature) = feature {
                    obj.insert("featureData".to_string(), feature.clone());
                }
            }
            WidgetKind::GridBookmark | WidgetKind::Unknown(_) => {}
        }
        Value::Object(obj)
    }
}

impl Serialize for Widget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Widget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
