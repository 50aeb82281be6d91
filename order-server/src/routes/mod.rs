use axum::Router;
use axum::body::Body;
use axum::extract::MatchedPath;
use http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};
use uuid::Uuid;

use crate::api;
use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// One span per request, keyed by the id set in [`SetRequestIdLayer`]
fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or_else(|| req.uri().path());

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %path,
    )
}

/// Build a router with all routes registered (no layers, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Root - plain text liveness
        .merge(api::root_router())
        // Health API
        .merge(api::health::router())
        // Order API
        .merge(api::orders::router())
}

/// Build a fully configured application with all layers and state
///
/// Used by both the HTTP server and in-process (oneshot) calls
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // Trace - one span and one completion line per request
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .with_state(state)
}
