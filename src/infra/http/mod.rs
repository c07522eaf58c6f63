mod auth;
mod authoring;
mod follow;
mod middleware;
mod public;

pub use auth::{CurrentUser, MaybeUser, login_redirect};
pub use public::{HttpState, build_router};

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Profile URL for `username`, percent-encoded for the `Location` header.
fn profile_location(username: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(username.as_bytes()).collect();
    format!("/profile/{encoded}/")
}

fn post_location(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_location_encodes_non_ascii_usernames() {
        assert_eq!(profile_location("leo"), "/profile/leo/");
        assert_eq!(profile_location("lev@home"), "/profile/lev%40home/");
        assert_eq!(profile_location("Лев"), "/profile/%D0%9B%D0%B5%D0%B2/");
    }
}
