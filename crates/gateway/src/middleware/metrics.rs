//! Request metrics middleware
//!
//! Records a count and latency observation for every matched route.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use formsmith_common::metrics::RequestMetrics;

/// Track one request through the router
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = endpoint_label(&request);

    let tracker = RequestMetrics::start(&method, &endpoint);
    let response = next.run(request).await;
    tracker.finish(response.status().as_u16());

    response
}

/// Label requests by route template, not raw path, so path parameters
/// don't explode metric cardinality.
fn endpoint_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_unrouted_request_gets_fallback_label() {
        let request = Request::builder()
            .uri("/v1/forms/123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(endpoint_label(&request), "unmatched");
    }
}
