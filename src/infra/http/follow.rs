use axum::{
    extract::{Path, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::{
    application::{error::HttpError, follow::FollowError},
    domain::entities::AuthorRecord,
    presentation::views::render_not_found_response,
};

use super::{CurrentUser, HttpState, profile_location};

pub(super) async fn profile_follow(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
    uri: Uri,
) -> Response {
    match state.follows.follow_username(&user, &username).await {
        Ok(author) => Redirect::to(&profile_location(&author.username)).into_response(),
        Err(err) => follow_error_to_response(&state, &user, &username, err, &uri),
    }
}

pub(super) async fn profile_unfollow(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
    uri: Uri,
) -> Response {
    match state.follows.unfollow_username(&user, &username).await {
        Ok(author) => Redirect::to(&profile_location(&author.username)).into_response(),
        Err(err) => follow_error_to_response(&state, &user, &username, err, &uri),
    }
}

fn follow_error_to_response(
    state: &HttpState,
    user: &AuthorRecord,
    username: &str,
    err: FollowError,
    uri: &Uri,
) -> Response {
    match err {
        FollowError::UnknownAuthor(_) => {
            render_not_found_response(state.chrome(Some(user)), uri.path())
        }
        FollowError::InvalidSelfFollow | FollowError::AlreadyFollowing => {
            debug!(
                target = "yatube::http::follow",
                follower = %user.username,
                author = username,
                reason = %err,
                "follow request left graph unchanged"
            );
            Redirect::to(&profile_location(username)).into_response()
        }
        FollowError::Repo(_) => HttpError::from(err).into_response(),
    }
}
