//! Request identity taken from the trusted header set by the login provider.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, uri::PathAndQuery},
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::{application::error::HttpError, domain::entities::AuthorRecord};

use super::HttpState;

/// An authenticated author. Rejects anonymous requests with a login redirect.
pub struct CurrentUser(pub AuthorRecord);

/// The viewer if one is authenticated.
pub struct MaybeUser(pub Option<AuthorRecord>);

impl FromRequestParts<HttpState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_viewer(parts, state).await? {
            Some(author) => Ok(Self(author)),
            None => {
                debug!(
                    target = "yatube::http::auth",
                    path = %parts.uri.path(),
                    "anonymous request to protected route"
                );
                Err(login_redirect(&state.auth.login_url, parts.uri.path_and_query()).into_response())
            }
        }
    }
}

impl FromRequestParts<HttpState> for MaybeUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        resolve_viewer(parts, state).await.map(Self)
    }
}

async fn resolve_viewer(
    parts: &Parts,
    state: &HttpState,
) -> Result<Option<AuthorRecord>, Response> {
    let Some(raw) = parts.headers.get(&state.auth.user_header) else {
        return Ok(None);
    };

    let username = match raw.to_str() {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(None),
    };

    state
        .authors
        .resolve_identity(username)
        .await
        .map(Some)
        .map_err(|err| HttpError::from(err).into_response())
}

/// Redirect to the login page, carrying the requested location in `next`.
///
/// Slashes stay literal so `/create/` becomes `?next=/create/`.
pub fn login_redirect(login_url: &str, requested: Option<&PathAndQuery>) -> Redirect {
    let next = requested.map(PathAndQuery::as_str).unwrap_or("/");
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    let encoded = encoded.replace("%2F", "/");
    let separator = if login_url.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{login_url}{separator}next={encoded}"))
}
