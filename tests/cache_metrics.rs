use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
    middleware,
    routing::get,
};
use metrics_util::debugging::DebuggingRecorder;
use tower::ServiceExt;
use yatube::cache::{PageCache, global_feed_cache};

#[tokio::test(start_paused = true)]
async fn page_cache_emits_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let cache = Arc::new(PageCache::new(
        NonZeroUsize::new(1).expect("non-zero"),
        Duration::from_secs(20),
    ));

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = Router::new()
        .route(
            "/",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "feed"
                }
            }),
        )
        .layer(middleware::from_fn_with_state(cache, global_feed_cache));

    // miss, hit, miss + evict, then an expired lookup.
    for (uri, advance) in [("/", 0), ("/", 0), ("/?page=2", 0), ("/?page=2", 30)] {
        tokio::time::advance(Duration::from_secs(advance)).await;
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "yatube_page_cache_hit_total",
        "yatube_page_cache_miss_total",
        "yatube_page_cache_evict_total",
        "yatube_page_cache_expired_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
