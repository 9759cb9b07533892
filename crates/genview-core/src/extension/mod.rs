//! Extension points.
//!
//! The engine consults named extension points at well-known UI moments.
//! Plugins register handlers against those names; a handler inspects the
//! runtime context and either offers a [`Capability`] or declines.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ install  ┌──────────────────────────────┐
//! │   Plugin A   │────────▶│        ExtensionPoints        │
//! │   Plugin B   │────────▶│ "Core-extraFeaturePanel" ──▶ [h1, h2, ...]
//! └──────────────┘          │ "<any other name>"     ──▶ [...]
//!                           └──────────────────────────────┘
//!                                         ▲ invoke(point, primary, ctx)
//!                                         │
//!                                  external engine
//! ```
//!
//! Point names are an open namespace: invoking a name nobody registered
//! for simply yields `None`.

pub mod plugin;
pub mod registry;

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::HandlerError;
use crate::feature::Feature;
use crate::render::RenderNode;

pub use plugin::{Plugin, PluginScope};
pub use registry::ExtensionPoints;

/// Extension point names used by the engine. Not exhaustive.
pub mod points {
    /// Extra panel in the feature details drawer. Context carries the feature.
    pub const EXTRA_FEATURE_PANEL: &str = "Core-extraFeaturePanel";
}

/// A UI unit the engine can mount.
#[async_trait]
pub trait Component: Send + Sync {
    /// Called when the engine shows the component for `feature`. Mounting
    /// again with another feature supersedes the previous mount.
    async fn mount(&self, feature: Feature);

    /// Current output. Never fails; error states render as a fallback node.
    fn render(&self) -> RenderNode;
}

/// What a handler offers: a named component.
#[derive(Clone)]
pub struct Capability {
    pub name: String,
    pub component: Arc<dyn Component>,
}

impl Capability {
    pub fn new(name: impl Into<String>, component: Arc<dyn Component>) -> Self {
        Self {
            name: name.into(),
            component,
        }
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Runtime context passed with an invocation.
#[derive(Debug, Clone, Default)]
pub struct ExtensionContext {
    pub feature: Option<Feature>,
    pub extra: Map<String, Value>,
}

impl ExtensionContext {
    pub fn for_feature(feature: Feature) -> Self {
        Self {
            feature: Some(feature),
            extra: Map::new(),
        }
    }
}

/// Handler outcome: `Ok(None)` means "not applicable".
pub type HandlerResult = Result<Option<Capability>, HandlerError>;

/// A registered handler. Must be a quick, synchronous decision.
pub type Handler = Arc<dyn Fn(&dyn Any, &ExtensionContext) -> HandlerResult + Send + Sync>;
