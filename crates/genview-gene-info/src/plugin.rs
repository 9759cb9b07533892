//! The plugin registering the gene information panel.

use std::sync::Arc;

use genview_core::detail::DetailPanel;
use genview_core::extension::{points, Capability, Plugin, PluginScope};

use crate::graphql::GraphQlTransport;
use crate::source::GeneInfoSource;

pub const PLUGIN_NAME: &str = "GeneInfoPlugin";
pub const PANEL_NAME: &str = "Gene Info";

/// Feature type the panel is offered for.
pub const GENE_TYPE: &str = "gene";

pub struct GeneInfoPlugin<T: GraphQlTransport> {
    source: Arc<GeneInfoSource<T>>,
}

impl<T: GraphQlTransport> GeneInfoPlugin<T> {
    pub fn new(transport: T) -> Self {
        Self {
            source: Arc::new(GeneInfoSource::new(transport)),
        }
    }

    pub fn source(&self) -> &Arc<GeneInfoSource<T>> {
        &self.source
    }
}

impl<T: GraphQlTransport> Plugin for GeneInfoPlugin<T> {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn install(&self, scope: &mut PluginScope<'_>) {
        let source = self.source.clone();
        scope.add_to_extension_point(points::EXTRA_FEATURE_PANEL, move |_, ctx| {
            let applies = ctx.feature.as_ref().is_some_and(|f| f.is_type(GENE_TYPE));
            if !applies {
                return Ok(None);
            }
            // Each opening gets its own panel; the source is shared.
            let panel = DetailPanel::new(source.clone());
            Ok(Some(Capability::new(PANEL_NAME, Arc::new(panel))))
        });
    }
}
