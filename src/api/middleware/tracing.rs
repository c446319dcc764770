//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, HttpMakeClassifier,
    TraceLayer,
};
use tracing::Level;

/// Request span layer applied to every route, public or guarded.
///
/// - span at `INFO` with method, URI and version
/// - request start at `DEBUG`
/// - response at `INFO` with status and latency in milliseconds
/// - 5xx responses additionally at `ERROR`
///
/// ```text
/// INFO request{method=GET uri=/api/companies/7/products version=HTTP/1.1}: finished processing request latency=4 ms status=200
/// ```
///
/// Token-verification outcomes are logged separately by the auth middleware,
/// so a 401 here carries no cause.
pub fn layer() -> TraceLayer<HttpMakeClassifier> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::ERROR)
                .latency_unit(LatencyUnit::Millis),
        )
}
