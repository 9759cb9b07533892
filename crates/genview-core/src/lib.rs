//! Core of the genview genome browser front end.
//!
//! - [`configuration`]: validated assemblies, tracks, adapters and the
//!   default session
//! - [`extension`]: named extension points and plugins
//! - [`detail`]: asynchronous feature detail panels
//! - [`lifecycle`]: the gate that withholds the view state until it is built
//! - [`context`]: one application instance tying these together

#![recursion_limit = "256"]

pub mod config;
pub mod configuration;
pub mod context;
pub mod detail;
pub mod error;
pub mod extension;
pub mod feature;
pub mod lifecycle;
pub mod presets;
pub mod render;
pub mod session;
pub mod token;

pub use configuration::{load, load_file, load_str, Configuration};
pub use context::{AppContext, AppContextBuilder};
pub use error::{ConfigError, ConstructionError, Error, FetchError, HandlerError, Result};
pub use feature::Feature;

/// Re-exports commonly used types.
pub mod prelude {
    // Configuration
    pub use crate::config::{endpoints, env_vars, normalize_base_uri};
    pub use crate::configuration::{Adapter, Assembly, Configuration, Location, Track, TrackKind};
    pub use crate::session::{NodeId, Session, View, Widget};

    // Error handling
    pub use crate::error::{
        AdapterError, ConfigError, ConstructionError, Error, FetchError, HandlerError, Result,
    };

    // Extensions
    pub use crate::extension::{
        points, Capability, Component, ExtensionContext, ExtensionPoints, Plugin, PluginScope,
    };
    pub use crate::feature::Feature;
    pub use crate::render::RenderNode;

    // Detail panels
    pub use crate::detail::{DetailPanel, DetailSource, LoadState};

    // Lifecycle
    pub use crate::context::AppContext;
    pub use crate::lifecycle::{GateStatus, ViewStateFactory, ViewStateGate};
}
