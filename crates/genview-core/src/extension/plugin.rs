//! Plugins and their installation scope.

use std::sync::Arc;

use super::registry::ExtensionPoints;
use super::{ExtensionContext, HandlerResult};

/// An independently authored extension of the application.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Register this plugin's handlers.
    fn install(&self, scope: &mut PluginScope<'_>);
}

/// Registration handle given to a plugin during [`Plugin::install`].
///
/// Everything registered through it is attributed to the plugin in logs
/// and fault counts.
pub struct PluginScope<'a> {
    points: &'a mut ExtensionPoints,
    plugin: String,
}

impl<'a> PluginScope<'a> {
    pub(crate) fn new(points: &'a mut ExtensionPoints, plugin: impl Into<String>) -> Self {
        Self {
            points,
            plugin: plugin.into(),
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Append `handler` to `point`.
    pub fn add_to_extension_point<F>(&mut self, point: &str, handler: F)
    where
        F: Fn(&dyn std::any::Any, &ExtensionContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.points
            .register_for(&self.plugin, point, Arc::new(handler));
    }
}
