//! Gene information detail source.

use async_trait::async_trait;
use genview_core::detail::DetailSource;
use genview_core::render::RenderNode;
use genview_core::{Feature, FetchError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graphql::{extract_field, GraphQlRequest, GraphQlTransport};
use crate::plugin::PANEL_NAME;

const FIELD: &str = "geneGeneralInformation";

/// `geneGeneralInformation` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneGeneralInformation {
    pub id: String,
    #[serde(default)]
    pub name_description: Option<Vec<String>>,
    #[serde(default)]
    pub gene_product: Option<String>,
    #[serde(default)]
    pub synonyms: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Looks genes up by feature name through a [`GraphQlTransport`].
pub struct GeneInfoSource<T: GraphQlTransport> {
    transport: T,
}

impl<T: GraphQlTransport> GeneInfoSource<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch and decode the information for `gene`.
    pub async fn lookup(&self, gene: &str) -> Result<GeneGeneralInformation, FetchError> {
        let body = self
            .transport
            .post(&GraphQlRequest::gene_information(gene))
            .await?;
        let info = extract_field(&body, FIELD)?;
        let info: GeneGeneralInformation = serde_json::from_value(info)
            .map_err(|e| FetchError::Malformed(format!("{}: {}", FIELD, e)))?;
        debug!(gene, id = %info.id, "gene information received");
        Ok(info)
    }
}

#[async_trait]
impl<T: GraphQlTransport> DetailSource for GeneInfoSource<T> {
    type Output = GeneGeneralInformation;

    fn title(&self) -> &str {
        PANEL_NAME
    }

    async fn fetch(&self, key: &str) -> Result<GeneGeneralInformation, FetchError> {
        self.lookup(key).await
    }

    fn render_ready(&self, feature: &Feature, info: &GeneGeneralInformation) -> RenderNode {
        let mut rows = vec![
            RenderNode::text(info.id.clone()),
            RenderNode::text(feature.label()),
        ];
        if let Some(description) = info.description.as_deref().filter(|d| !d.is_empty()) {
            rows.push(RenderNode::text(description));
        }
        if let Some(product) = info.gene_product.as_deref().filter(|p| !p.is_empty()) {
            rows.push(RenderNode::text(format!("Product: {}", product)));
        }
        if let Some(synonyms) = info.synonyms.as_ref().filter(|s| !s.is_empty()) {
            rows.push(RenderNode::text(format!("Synonyms: {}", synonyms.join(", "))));
        }
        RenderNode::section(PANEL_NAME, rows)
    }
}
