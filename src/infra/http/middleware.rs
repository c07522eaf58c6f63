use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{error, info_span, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Log 4xx responses at `warn` and 5xx at `error`, with any attached [`ErrorReport`].
///
/// Request details live on a `failed_response` span so both levels share them.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    let source = report.as_ref().map_or("unknown", |report| report.source);
    let chain = report.map(|report| report.messages).unwrap_or_default();
    let detail = chain.first().map_or("no diagnostic available", String::as_str);

    let span = info_span!(
        target: "yatube::http::response",
        "failed_response",
        status = status.as_u16(),
        method = %method,
        path = %uri.path(),
        query = uri.query().unwrap_or(""),
        elapsed_ms = start.elapsed().as_millis(),
        source,
        request_id = %request_id,
    );
    let _entered = span.enter();

    if status.is_server_error() {
        error!(target: "yatube::http::response", detail, ?chain, "request failed");
    } else {
        warn!(target: "yatube::http::response", detail, "client request error");
    }

    response
}
