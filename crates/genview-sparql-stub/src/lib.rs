//! Development SPARQL endpoint.
//!
//! Answers `SELECT` queries from the SPARQL adapter with a fixed set of
//! dummy gene features, filtered by the coordinate range found in the
//! query. Good enough to exercise a SPARQL-backed track without a triple
//! store.
//!
//! Routes:
//! - `GET /` usage page
//! - `GET /sparql?query=...`
//! - `POST /sparql` with a form-encoded `query` field

pub mod features;
pub mod handlers;
pub mod query;
pub mod results;

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use genview_core::config::endpoints;
use tokio::net::TcpListener;

pub use features::{dummy_features, features_in_range, DummyFeature};
pub use handlers::StubError;
pub use query::{parse_query, QueryRange};
pub use results::{SparqlResults, SPARQL_RESULTS_JSON};

/// Largest accepted request body (form-encoded queries).
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// Build the stub's router.
pub fn router() -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route(
            endpoints::SPARQL_PATH,
            get(handlers::sparql_get_handler).post(handlers::sparql_post_handler),
        )
        .layer(tower_http::limit::RequestBodyLimitLayer::new(
            MAX_REQUEST_BODY_SIZE,
        ))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

/// Serve on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("SPARQL stub listening on http://{}", addr);
    tracing::info!("SPARQL endpoint: http://{}{}", addr, endpoints::SPARQL_PATH);
    axum::serve(listener, router()).await
}

/// Bind `addr` and serve.
pub async fn run(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener).await
}
