use axum::{
    body::Body,
    http::{HeaderName, Request},
};
use tower::{
    layer::util::{Identity, Stack},
    ServiceBuilder,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

type MakeSpan = fn(&Request<Body>) -> tracing::Span;

type RequestTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeSpan, DefaultOnRequest, DefaultOnResponse>;

type RequestIdTracing = Stack<
    PropagateRequestIdLayer,
    Stack<RequestTraceLayer, Stack<SetRequestIdLayer<MakeRequestUuid>, Identity>>,
>;

fn make_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Assigns every request an `x-request-id`, echoes it on the response and
/// opens a span carrying it.
pub fn trace_with_request_id_layer() -> ServiceBuilder<RequestIdTracing> {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(header.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span as MakeSpan)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(header))
}
