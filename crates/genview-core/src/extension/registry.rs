//! Extension point registry and dispatch.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use super::plugin::{Plugin, PluginScope};
use super::{Capability, ExtensionContext, Handler, HandlerResult};
use crate::error::HandlerError;

/// Plugin name used for handlers registered outside a plugin.
pub const ANONYMOUS_PLUGIN: &str = "anonymous";

struct Registration {
    plugin: String,
    handler: Handler,
    faults: AtomicU64,
}

/// Map from extension point name to its handlers, in registration order.
#[derive(Default)]
pub struct ExtensionPoints {
    points: HashMap<String, Vec<Registration>>,
    plugins: Vec<String>,
}

impl ExtensionPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to `point`.
    pub fn register<F>(&mut self, point: &str, handler: F)
    where
        F: Fn(&dyn Any, &ExtensionContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_for(ANONYMOUS_PLUGIN, point, Arc::new(handler));
    }

    /// Append a handler to `point`, attributed to `plugin`.
    pub fn register_for(&mut self, plugin: &str, point: &str, handler: Handler) {
        debug!(category = "extensions", point, plugin, "handler registered");
        self.points
            .entry(point.to_string())
            .or_default()
            .push(Registration {
                plugin: plugin.to_string(),
                handler,
                faults: AtomicU64::new(0),
            });
    }

    /// Let `plugin` register its handlers.
    pub fn install(&mut self, plugin: &dyn Plugin) {
        let name = plugin.name().to_string();
        {
            let mut scope = PluginScope::new(self, name.clone());
            plugin.install(&mut scope);
        }
        debug!(category = "extensions", plugin = %name, "plugin installed");
        self.plugins.push(name);
    }

    /// Names of installed plugins, in install order.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// First capability offered for `point`, in registration order.
    ///
    /// A handler that fails or panics is logged and skipped.
    pub fn invoke(
        &self,
        point: &str,
        primary: &dyn Any,
        ctx: &ExtensionContext,
    ) -> Option<Capability> {
        self.registrations(point)
            .iter()
            .find_map(|reg| Self::call(point, reg, primary, ctx))
    }

    /// Every capability offered for `point`, in registration order.
    pub fn invoke_all(
        &self,
        point: &str,
        primary: &dyn Any,
        ctx: &ExtensionContext,
    ) -> Vec<Capability> {
        self.registrations(point)
            .iter()
            .filter_map(|reg| Self::call(point, reg, primary, ctx))
            .collect()
    }

    pub fn has_handlers(&self, point: &str) -> bool {
        !self.registrations(point).is_empty()
    }

    pub fn handler_count(&self, point: &str) -> usize {
        self.registrations(point).len()
    }

    /// Points with at least one handler, sorted.
    pub fn point_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.points.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Failures and panics recorded for `plugin`'s handlers on `point`.
    pub fn fault_count(&self, point: &str, plugin: &str) -> u64 {
        self.registrations(point)
            .iter()
            .filter(|reg| reg.plugin == plugin)
            .map(|reg| reg.faults.load(Ordering::Relaxed))
            .sum()
    }

    fn registrations(&self, point: &str) -> &[Registration] {
        self.points.get(point).map(Vec::as_slice).unwrap_or(&[])
    }

    fn call(
        point: &str,
        reg: &Registration,
        primary: &dyn Any,
        ctx: &ExtensionContext,
    ) -> Option<Capability> {
        let outcome = catch_unwind(AssertUnwindSafe(|| (reg.handler)(primary, ctx)))
            .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(capability) => capability,
            Err(e) => {
                reg.faults.fetch_add(1, Ordering::Relaxed);
                warn!(
                    category = "extensions",
                    point,
                    plugin = %reg.plugin,
                    error = %e,
                    "extension handler failed, skipping"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for ExtensionPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .points
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("ExtensionPoints")
            .field("points", &counts)
            .field("plugins", &self.plugins)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
