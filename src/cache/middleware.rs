//! Page cache middleware for the global feed.
//!
//! Serves a stored copy of `GET /` while it is fresh and stores fresh `200 OK`
//! renders otherwise. Other methods pass straight through.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderValue, Method, Request, StatusCode,
        header::SET_COOKIE,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::application::{error::HttpError, pagination::PageNumber};

use super::{CacheKey, CachedResponse, PageCache};

const MAX_CACHED_BODY_BYTES: usize = 1024 * 1024;

pub async fn global_feed_cache(
    State(cache): State<Arc<PageCache>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = CacheKey::GlobalFeed {
        page: page_param(request.uri().query()),
    };

    if let Some(cached) = cache.get(&key) {
        debug!(target = "yatube::cache", ?key, outcome = "hit", "serving cached page");
        return build_response(cached);
    }

    debug!(target = "yatube::cache", ?key, outcome = "miss", "rendering page");
    let response = next.run(request).await;

    if response.status() != StatusCode::OK || response.headers().contains_key(SET_COOKIE) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(target = "yatube::cache", error = %err, "failed to buffer page for caching");
            return HttpError::new(
                "cache::middleware::global_feed_cache",
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                err.to_string(),
            )
            .into_response();
        }
    };

    cache.put(
        key,
        CachedResponse::from_parts(&parts, bytes.clone()),
        cache.ttl(),
    );
    Response::from_parts(parts, Body::from(bytes))
}

/// Requested page number as it will be resolved by the feed handler.
fn page_param(query: Option<&str>) -> PageNumber {
    PageNumber::new(PageNumber::from_query(query).get().max(1))
}

fn build_response(cached: CachedResponse) -> Response {
    let mut builder = Response::builder().status(cached.status);

    for (name, value) in cached.headers {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, header_value);
        }
    }

    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_param_matches_feed_parsing() {
        assert_eq!(page_param(None), PageNumber::FIRST);
        assert_eq!(page_param(Some("page=2")), PageNumber::new(2));
        assert_eq!(page_param(Some("utm=x&page=3")), PageNumber::new(3));
        assert_eq!(page_param(Some("page=abc")), PageNumber::FIRST);
        assert_eq!(page_param(Some("page=-4")), PageNumber::FIRST);
        assert_eq!(page_param(Some("other=1")), PageNumber::FIRST);
        assert_eq!(page_param(Some("page=2&page=5")), PageNumber::new(2));
    }

    #[test]
    fn build_response_replays_status_headers_and_body() {
        let cached = CachedResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/html; charset=utf-8".to_string())],
            body: bytes::Bytes::from_static(b"<p>feed</p>"),
        };

        let response = build_response(cached);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.as_bytes()),
            Some(&b"text/html; charset=utf-8"[..])
        );
    }
}
