//! Time-boxed cache of rendered global feed pages.
//!
//! The cache is an explicit service handed to the router, not process-global
//! state. It is never invalidated by content writes: a new post shows up on
//! the global feed once the cached page's TTL has elapsed.

mod lock;
mod middleware;
mod store;

pub use middleware::global_feed_cache;
pub use store::{CacheKey, CachedResponse, PageCache};
