use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, RawQuery, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    application::{
        authors::AuthorService,
        error::HttpError,
        feed::{FeedError, FeedService},
        follow::FollowService,
        pagination::PageNumber,
        posts::PostService,
        repos::HealthRepo,
    },
    cache::{PageCache, global_feed_cache},
    config::AuthSettings,
    domain::entities::AuthorRecord,
    presentation::views::{
        ChromeView, CommentView, FollowTemplate, GroupListTemplate, GroupView, IndexTemplate,
        PostCardView, PostDetailTemplate, ProfileTemplate, feed_page, render_not_found_response,
        render_template_response,
    },
};

use super::{
    CurrentUser, MaybeUser, authoring, db_health_response, follow,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub follows: Arc<FollowService>,
    pub authors: Arc<AuthorService>,
    pub health: Arc<dyn HealthRepo>,
    pub auth: AuthSettings,
    pub cache: Option<Arc<PageCache>>,
}

impl HttpState {
    pub(super) fn chrome(&self, viewer: Option<&AuthorRecord>) -> ChromeView {
        ChromeView::new(viewer, &self.auth.login_url)
    }
}

pub fn build_router(state: HttpState) -> Router {
    // Only the global feed is cached; it renders without viewer chrome.
    let mut feed_routes = Router::new().route("/", get(index));
    if let Some(cache) = state.cache.clone() {
        feed_routes =
            feed_routes.route_layer(middleware::from_fn_with_state(cache, global_feed_cache));
    }

    let routes = Router::new()
        .route("/group/{slug}/", get(group_posts))
        .route("/profile/{username}/", get(profile))
        .route("/profile/{username}/follow/", get(follow::profile_follow))
        .route("/profile/{username}/unfollow/", get(follow::profile_unfollow))
        .route("/follow/", get(follow_index))
        .route("/posts/{post_id}/", get(post_detail))
        .route(
            "/create/",
            get(authoring::post_create_form).post(authoring::post_create),
        )
        .route(
            "/posts/{post_id}/edit/",
            get(authoring::post_edit_form).post(authoring::post_edit),
        )
        .route("/posts/{post_id}/comment/", post(authoring::add_comment))
        .route("/posts/{post_id}/delete/", post(authoring::post_delete))
        .route("/_health/db", get(public_health));

    feed_routes
        .merge(routes)
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// Path ids that are not integers name no post.
pub(super) fn parse_post_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

async fn index(State(state): State<HttpState>, RawQuery(query): RawQuery) -> Response {
    match state.feed.global_feed(PageNumber::from_query(query.as_deref())).await {
        Ok(page) => {
            let (posts, paginator) = feed_page(&page);
            let template = IndexTemplate {
                chrome: state.chrome(None),
                posts,
                paginator,
            };
            render_template_response(template, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn group_posts(
    State(state): State<HttpState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
    RawQuery(query): RawQuery,
    uri: Uri,
) -> Response {
    let chrome = state.chrome(viewer.as_ref());
    match state.feed.group_feed(&slug, PageNumber::from_query(query.as_deref())).await {
        Ok(feed) => {
            let (posts, paginator) = feed_page(&feed.page);
            let template = GroupListTemplate {
                chrome,
                group: GroupView::from(&feed.group),
                posts,
                paginator,
            };
            render_template_response(template, StatusCode::OK)
        }
        Err(err) => feed_error_to_response(err, chrome, &uri),
    }
}

async fn profile(
    State(state): State<HttpState>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
    RawQuery(query): RawQuery,
    uri: Uri,
) -> Response {
    let chrome = state.chrome(viewer.as_ref());
    match state
        .feed
        .profile_feed(&username, viewer.as_ref(), PageNumber::from_query(query.as_deref()))
        .await
    {
        Ok(feed) => {
            let post_count = feed.post_count();
            let (posts, paginator) = feed_page(&feed.page);
            let template = ProfileTemplate {
                chrome,
                author: feed.author.username,
                post_count,
                follower_count: feed.follower_count,
                following: feed.viewer_follows,
                posts,
                paginator,
            };
            render_template_response(template, StatusCode::OK)
        }
        Err(err) => feed_error_to_response(err, chrome, &uri),
    }
}

async fn follow_index(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    RawQuery(query): RawQuery,
) -> Response {
    match state.feed.personalized_feed(&user, PageNumber::from_query(query.as_deref())).await {
        Ok(page) => {
            let (posts, paginator) = feed_page(&page);
            let template = FollowTemplate {
                chrome: state.chrome(Some(&user)),
                posts,
                paginator,
            };
            render_template_response(template, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    MaybeUser(viewer): MaybeUser,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Response {
    let chrome = state.chrome(viewer.as_ref());
    let Some(post_id) = parse_post_id(&raw_id) else {
        return render_not_found_response(chrome, uri.path());
    };

    match state.feed.post_detail(post_id).await {
        Ok(detail) => {
            let can_edit = viewer
                .as_ref()
                .is_some_and(|viewer| detail.entry.post.is_authored_by(viewer.id));
            let template = PostDetailTemplate {
                chrome,
                post: PostCardView::from(&detail.entry),
                author_post_count: detail.author_post_count,
                comments: detail.comments.iter().map(CommentView::from).collect(),
                can_edit,
                can_comment: viewer.is_some(),
            };
            render_template_response(template, StatusCode::OK)
        }
        Err(err) => feed_error_to_response(err, chrome, &uri),
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}

async fn fallback(State(state): State<HttpState>, uri: Uri) -> Response {
    render_not_found_response(state.chrome(None), uri.path())
}

fn feed_error_to_response(err: FeedError, chrome: ChromeView, uri: &Uri) -> Response {
    match err {
        FeedError::UnknownGroup(_) | FeedError::UnknownAuthor(_) | FeedError::PostNotFound(_) => {
            render_not_found_response(chrome, uri.path())
        }
        FeedError::Repo(_) => HttpError::from(err).into_response(),
    }
}
