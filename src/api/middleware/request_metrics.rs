//! Request counting middleware

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::metrics::Metrics;

/// Route label for requests no route matched (static files, 404s)
pub const FALLBACK_ROUTE: &str = "fallback";

/// Counts every response by method, route and status
///
/// The route label is the matched route template. Requests that fell
/// through to static file serving share [`FALLBACK_ROUTE`] so arbitrary
/// paths never create new series.
pub async fn request_metrics(
    State(metrics): State<Arc<Metrics>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| FALLBACK_ROUTE.to_string());

    let response = next.run(request).await;

    metrics.record_request(&method, &route, response.status().as_u16());
    response
}
