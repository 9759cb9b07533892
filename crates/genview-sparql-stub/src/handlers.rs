//! HTTP handlers.

use axum::extract::{Form, Query};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::features::features_in_range;
use crate::query::parse_query;
use crate::results::{SparqlResults, SPARQL_RESULTS_JSON};

/// Request errors, answered as plain-text `400`s.
#[derive(Debug, Error)]
pub enum StubError {
    #[error("Missing query parameter")]
    MissingQuery,

    #[error("Error parsing query: {0}")]
    InvalidQuery(String),

    #[error("Error encoding response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StubError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingQuery | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// `query` parameter or form field.
#[derive(Debug, Default, Deserialize)]
pub struct SparqlParams {
    pub query: Option<String>,
}

/// GET /sparql
pub async fn sparql_get_handler(Query(params): Query<SparqlParams>) -> Result<Response, StubError> {
    answer(params)
}

/// POST /sparql
pub async fn sparql_post_handler(Form(params): Form<SparqlParams>) -> Result<Response, StubError> {
    answer(params)
}

/// Undo a second layer of URL encoding, keeping the text as is when it
/// does not decode.
fn decode_query(query: &str) -> String {
    let unplussed = query.replace('+', " ");
    match urlencoding::decode(&unplussed) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => query.to_string(),
    }
}

fn answer(params: SparqlParams) -> Result<Response, StubError> {
    let query = params
        .query
        .filter(|q| !q.is_empty())
        .ok_or(StubError::MissingQuery)?;
    let query = decode_query(&query);
    info!(query = %query, "received SPARQL query");

    let range = parse_query(&query).map_err(|e| {
        warn!(error = %e, "failed to parse SPARQL query");
        StubError::InvalidQuery(e)
    })?;
    info!(
        ref_name = %range.ref_name,
        start = range.start,
        end = range.end,
        "parsed query range"
    );

    let results = SparqlResults::from_features(features_in_range(range.start, range.end));
    let body = serde_json::to_string(&results)?;
    info!(count = results.len(), "returning features");

    Ok(([(header::CONTENT_TYPE, SPARQL_RESULTS_JSON)], body).into_response())
}

/// GET /
pub async fn root_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Dummy SPARQL Server</title>
</head>
<body>
    <h1>Dummy SPARQL Server</h1>
    <p>A test SPARQL endpoint that returns dummy genomic features.</p>

    <h2>Usage</h2>
    <p>Send SPARQL queries to the <code>/sparql</code> endpoint.</p>

    <h3>Example Query</h3>
    <pre>
PREFIX faldo: &lt;http://biohackathon.org/resource/faldo#&gt;

SELECT ?uniqueId ?start ?end ?name ?note ?strand ?type
WHERE {
  ?location faldo:reference &lt;http://example.org/chr1&gt; .
  FILTER ( (?start >= 0) && (?end <= 100000) )
}
    </pre>

    <h3>Available Features</h3>
    <ul>
        <li>gene001: 10000-20000 (GENE1, strand +1)</li>
        <li>gene002: 25000-35000 (GENE2, strand -1)</li>
        <li>gene003: 40000-50000 (GENE3, strand +1)</li>
        <li>gene004: 55000-65000 (GENE4, strand -1)</li>
        <li>gene005: 70000-80000 (GENE5, strand +1)</li>
    </ul>

    <p><a href="/sparql?query=SELECT%20%3FuniqueId%20%3Fstart%20%3Fend%20%3Fname%20WHERE%20%7B%20FILTER%20(%20(%3Fstart%20%3E%3D%200)%20%26%26%20(%3Fend%20%3C%3D%20100000)%20)%20%7D">Test Query</a></p>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_query() {
        assert_eq!(decode_query("%3Fstart%20%3E%3D%200"), "?start >= 0");
        assert_eq!(decode_query("a+b"), "a b");
        // Invalid UTF-8 after decoding: keep the original.
        assert_eq!(decode_query("%FF"), "%FF");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(StubError::MissingQuery.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            StubError::InvalidQuery("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
