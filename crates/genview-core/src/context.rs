//! Application context.
//!
//! One [`AppContext`] per application instance owns the extension points,
//! the plugin list and the view-state gate. Nothing is process-global.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::configuration::{self, Configuration};
use crate::error::{ConfigError, ConstructionError};
use crate::extension::{points, Capability, ExtensionContext, ExtensionPoints, Plugin};
use crate::feature::Feature;
use crate::lifecycle::{HttpResolver, ResolvingFactory, ViewStateFactory, ViewStateGate};

/// Default factory: resolve resources over HTTP, then build the state.
pub type DefaultFactory = ResolvingFactory<HttpResolver>;

pub struct AppContext<F: ViewStateFactory = DefaultFactory> {
    extension_points: ExtensionPoints,
    plugins: Vec<Arc<dyn Plugin>>,
    gate: ViewStateGate<F>,
}

#[derive(Default)]
pub struct AppContextBuilder {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl AppContextBuilder {
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn plugin_arc(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Install plugins in the order given and wire up `factory`.
    pub fn build<F: ViewStateFactory>(self, factory: F) -> AppContext<F> {
        let mut extension_points = ExtensionPoints::new();
        for plugin in &self.plugins {
            extension_points.install(plugin.as_ref());
        }
        info!(
            plugins = self.plugins.len(),
            points = extension_points.point_names().len(),
            "application context built"
        );
        AppContext {
            extension_points,
            plugins: self.plugins,
            gate: ViewStateGate::new(Arc::new(factory)),
        }
    }

    /// Build with an [`HttpResolver`] configured from the environment.
    pub fn build_default(self) -> Result<AppContext<DefaultFactory>, ConstructionError> {
        let resolver = HttpResolver::from_env()?;
        Ok(self.build(ResolvingFactory::new(resolver)))
    }
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }
}

impl<F: ViewStateFactory> AppContext<F> {
    /// Validate a configuration document.
    pub fn load_configuration(&self, raw: &Value) -> Result<Arc<Configuration>, ConfigError> {
        configuration::load(raw).map(Arc::new)
    }

    pub fn extension_points(&self) -> &ExtensionPoints {
        &self.extension_points
    }

    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    pub fn gate(&self) -> &ViewStateGate<F> {
        &self.gate
    }

    /// Start (or restart) view-state construction for `configuration`.
    pub async fn start(
        &self,
        configuration: Arc<Configuration>,
    ) -> Result<Arc<F::State>, ConstructionError> {
        self.gate.create(configuration, self.plugins.clone()).await
    }

    /// First extra feature panel offered for `feature`.
    ///
    /// Handlers receive the current view state (`Option<Arc<F::State>>`) as
    /// their primary argument.
    pub fn feature_panel(&self, feature: &Feature) -> Option<Capability> {
        let state = self.gate.current();
        self.extension_points.invoke(
            points::EXTRA_FEATURE_PANEL,
            &state,
            &ExtensionContext::for_feature(feature.clone()),
        )
    }

    /// Every extra feature panel offered for `feature`.
    pub fn feature_panels(&self, feature: &Feature) -> Vec<Capability> {
        let state = self.gate.current();
        self.extension_points.invoke_all(
            points::EXTRA_FEATURE_PANEL,
            &state,
            &ExtensionContext::for_feature(feature.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{Component, PluginScope};
    use crate::lifecycle::ResourceResolver;
    use crate::configuration::Location;
    use crate::presets;
    use crate::render::RenderNode;
    use async_trait::async_trait;

    struct Always;

    #[async_trait]
    impl ResourceResolver for Always {
        async fn resolve(&self, _location: &Location) -> Result<(), String> {
            Ok(())
        }
    }

    struct Note;

    #[async_trait]
    impl Component for Note {
        async fn mount(&self, _feature: Feature) {}

        fn render(&self) -> RenderNode {
            RenderNode::text("note")
        }
    }

    struct NotePlugin;

    impl Plugin for NotePlugin {
        fn name(&self) -> &str {
            "NotePlugin"
        }

        fn install(&self, scope: &mut PluginScope<'_>) {
            scope.add_to_extension_point(points::EXTRA_FEATURE_PANEL, |_, ctx| {
                Ok(ctx
                    .feature
                    .as_ref()
                    .filter(|f| f.attribute("note").is_some())
                    .map(|_| Capability::new("Note", Arc::new(Note))))
            });
        }
    }

    #[tokio::test]
    async fn test_context_wires_plugins_and_gate() {
        let ctx = AppContext::builder()
            .plugin(NotePlugin)
            .build(ResolvingFactory::new(Always));
        assert_eq!(ctx.plugins().len(), 1);
        assert_eq!(ctx.extension_points().handler_count(points::EXTRA_FEATURE_PANEL), 1);

        let raw = presets::Preset::Dicty.document("http://localhost:8080");
        let config = ctx.load_configuration(&raw).unwrap();
        assert!(!ctx.gate().is_ready());

        let state = ctx.start(config).await.unwrap();
        assert_eq!(state.plugins, vec!["NotePlugin".to_string()]);
        assert!(ctx.gate().is_ready());

        let mut feature = Feature::new("f1");
        assert!(ctx.feature_panel(&feature).is_none());
        feature.attributes.insert("note".into(), Value::from("hello"));
        assert_eq!(ctx.feature_panels(&feature).len(), 1);
    }
}
