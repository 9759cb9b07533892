//! View-state lifecycle.
//!
//! The engine's view state is built asynchronously from a configuration and
//! the plugin list. [`ViewStateGate`] runs that construction and only ever
//! exposes a finished state: callers see "not available" until the latest
//! construction settles successfully.

pub mod gate;
pub mod resolve;

use std::sync::Arc;

use async_trait::async_trait;

use crate::configuration::Configuration;
use crate::error::ConstructionError;
use crate::extension::Plugin;

pub use gate::{GateStatus, ViewStateGate};
pub use resolve::{EngineViewState, HttpResolver, ResolvingFactory, ResourceResolver};

/// Builds the engine's view state.
#[async_trait]
pub trait ViewStateFactory: Send + Sync + 'static {
    type State: Send + Sync + 'static;

    async fn construct(
        &self,
        configuration: Arc<Configuration>,
        plugins: Vec<Arc<dyn Plugin>>,
    ) -> Result<Self::State, ConstructionError>;
}
