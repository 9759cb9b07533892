//! Tests for the SPARQL stub handlers.

use axum::body::to_bytes;
use axum::extract::{Form, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use genview_sparql_stub::handlers::{
    root_handler, sparql_get_handler, sparql_post_handler, SparqlParams,
};
use genview_sparql_stub::{SparqlResults, SPARQL_RESULTS_JSON};

fn params(query: &str) -> SparqlParams {
    SparqlParams {
        query: Some(query.to_string()),
    }
}

async fn into_results(response: Response) -> SparqlResults {
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        SPARQL_RESULTS_JSON
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn unique_ids(results: &SparqlResults) -> Vec<&str> {
    results
        .results
        .bindings
        .iter()
        .map(|b| b["uniqueId"].value.as_str())
        .collect()
}

#[tokio::test]
async fn test_get_filters_by_range() {
    let query = "SELECT ?uniqueId ?start ?end ?name ?note ?strand ?type WHERE { \
                 ?location faldo:reference <http://example.org/chr1> . \
                 FILTER ( (?start >= 30000) && (?end <= 58000) ) }";
    let response = sparql_get_handler(Query(params(query))).await.unwrap();
    let results = into_results(response).await;

    assert_eq!(results.head.vars.len(), 7);
    assert_eq!(unique_ids(&results), vec!["gene002", "gene003", "gene004"]);
    assert_eq!(results.results.bindings[1]["start"].value, "40000");
}

#[tokio::test]
async fn test_post_form_and_double_encoding() {
    let query = "SELECT%20%3FuniqueId%20WHERE%20%7B%20FILTER%20(%20(%3Fstart%20%3E%3D%200)%20%26%26%20(%3Fend%20%3C%3D%2020000)%20)%20%7D";
    let response = sparql_post_handler(Form(params(query))).await.unwrap();
    let results = into_results(response).await;
    assert_eq!(unique_ids(&results), vec!["gene001"]);
}

#[tokio::test]
async fn test_missing_query_is_bad_request() {
    let err = sparql_get_handler(Query(SparqlParams::default()))
        .await
        .unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let err = sparql_post_handler(Form(params(""))).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparseable_range_is_bad_request() {
    let query = "FILTER ( (?start >= 123456789012345678901234567890) )";
    let err = sparql_get_handler(Query(params(query))).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_root_page() {
    let page = root_handler().await;
    assert!(page.0.contains("/sparql"));
    assert!(page.0.contains("gene005"));
}

#[tokio::test]
async fn test_served_with_cors() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(genview_sparql_stub::serve(listener));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/sparql", addr))
        .query(&[("query", "FILTER ( (?start >= 60000) && (?end <= 90000) )")])
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let results: SparqlResults = response.json().await.unwrap();
    assert_eq!(unique_ids(&results), vec!["gene004", "gene005"]);
}
