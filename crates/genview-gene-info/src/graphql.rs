//! GraphQL request envelope and transport.

use std::time::Duration;

use async_trait::async_trait;
use genview_core::config;
use genview_core::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Operation name sent with every gene lookup.
pub const OPERATION_NAME: &str = "GeneGeneralInformationSummary";

/// Query text for [`OPERATION_NAME`].
pub const GENE_QUERY: &str = "query GeneGeneralInformationSummary($gene: String!) {
  geneGeneralInformation(gene: $gene) {
    id
    name_description
    gene_product
    synonyms
    description
    __typename
  }
}";

/// `{operationName, variables, query}` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub operation_name: String,
    pub variables: Value,
    pub query: String,
}

impl GraphQlRequest {
    pub fn gene_information(gene: &str) -> Self {
        Self {
            operation_name: OPERATION_NAME.to_string(),
            variables: json!({ "gene": gene }),
            query: GENE_QUERY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
}

/// Take `data.<field>` out of a response body.
///
/// A non-empty `errors` array wins over any partial data.
pub fn extract_field(body: &Value, field: &str) -> Result<Value, FetchError> {
    if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
        let entries: Vec<ErrorEntry> = serde_json::from_value(errors.clone())
            .map_err(|e| FetchError::Malformed(format!("errors: {}", e)))?;
        if !entries.is_empty() {
            let messages: Vec<_> = entries.into_iter().map(|e| e.message).collect();
            return Err(FetchError::Remote(messages.join("; ")));
        }
    }
    let data = body
        .get("data")
        .filter(|d| !d.is_null())
        .ok_or_else(|| FetchError::MissingField("data".to_string()))?;
    data.get(field)
        .filter(|v| !v.is_null())
        .cloned()
        .ok_or_else(|| FetchError::MissingField(format!("data.{}", field)))
}

/// Sends a request and returns the decoded JSON body.
#[async_trait]
pub trait GraphQlTransport: Send + Sync + 'static {
    async fn post(&self, request: &GraphQlRequest) -> Result<Value, FetchError>;
}

/// HTTP transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint and timeout from the environment.
    pub fn from_env() -> Result<Self, FetchError> {
        Self::new(
            config::gene_info_endpoint(),
            Duration::from_secs(config::resolve_timeout_secs()),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GraphQlTransport for ReqwestTransport {
    async fn post(&self, request: &GraphQlRequest) -> Result<Value, FetchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_envelope() {
        let body = serde_json::to_value(GraphQlRequest::gene_information("aslA-2")).unwrap();
        assert_eq!(body["operationName"], "GeneGeneralInformationSummary");
        assert_eq!(body["variables"], json!({"gene": "aslA-2"}));
        assert!(body["query"].as_str().unwrap().contains("geneGeneralInformation(gene: $gene)"));
    }

    #[test]
    fn test_extract_field() {
        let body = json!({"data": {"geneGeneralInformation": {"id": "DDB_G0267364"}}});
        assert_eq!(
            extract_field(&body, "geneGeneralInformation").unwrap()["id"],
            "DDB_G0267364"
        );

        assert_eq!(
            extract_field(&json!({}), "geneGeneralInformation"),
            Err(FetchError::MissingField("data".into()))
        );
        assert_eq!(
            extract_field(&json!({"data": {"geneGeneralInformation": null}}), "geneGeneralInformation"),
            Err(FetchError::MissingField("data.geneGeneralInformation".into()))
        );
        assert_eq!(
            extract_field(
                &json!({"data": null, "errors": [{"message": "gene not found"}]}),
                "geneGeneralInformation"
            ),
            Err(FetchError::Remote("gene not found".into()))
        );
    }
}
