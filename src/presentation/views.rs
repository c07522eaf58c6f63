use crate::application::error::{ErrorReport, HttpError};
use crate::application::pagination::{Page, PageWindow};
use crate::application::posts::FieldErrors;
use crate::domain::entities::{AuthorRecord, CommentEntry, GroupRecord, PostEntry};
use crate::domain::posts::{format_human_date, format_iso_date};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// The shared not-found page, used for unknown routes and missing records alike.
pub fn render_not_found_response(chrome: ChromeView, path: &str) -> Response {
    let template = NotFoundTemplate {
        chrome,
        path: path.to_string(),
    };
    let mut response = render_template_response(template, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        format!("no resource at {path}"),
    )
    .attach(&mut response);
    response
}

/// Navigation state shared by every page.
#[derive(Clone)]
pub struct ChromeView {
    pub viewer: Option<String>,
    pub login_url: String,
}

impl ChromeView {
    pub fn new(viewer: Option<&AuthorRecord>, login_url: &str) -> Self {
        Self {
            viewer: viewer.map(|author| author.username.clone()),
            login_url: login_url.to_string(),
        }
    }

    /// Chrome without a viewer, for pages shared across users.
    pub fn anonymous(login_url: &str) -> Self {
        Self::new(None, login_url)
    }
}

#[derive(Clone)]
pub struct PostCardView {
    pub id: i64,
    pub text: String,
    pub preview: String,
    pub author: String,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
    pub image: Option<String>,
    pub published: String,
    pub iso_date: String,
}

impl From<&PostEntry> for PostCardView {
    fn from(entry: &PostEntry) -> Self {
        Self {
            id: entry.post.id,
            text: entry.post.text.clone(),
            preview: entry.post.preview(),
            author: entry.author.username.clone(),
            group_title: entry.group.as_ref().map(|group| group.title.clone()),
            group_slug: entry.group.as_ref().map(|group| group.slug.clone()),
            image: entry.post.image.clone(),
            published: format_human_date(entry.post.created_at),
            iso_date: format_iso_date(entry.post.created_at),
        }
    }
}

pub struct PaginatorView {
    pub number: u32,
    pub num_pages: u32,
    pub total: u64,
    pub previous: Option<u32>,
    pub next: Option<u32>,
}

impl PaginatorView {
    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}

impl From<&PageWindow> for PaginatorView {
    fn from(window: &PageWindow) -> Self {
        Self {
            number: window.number,
            num_pages: window.num_pages,
            total: window.total,
            previous: window.previous_number(),
            next: window.next_number(),
        }
    }
}

/// Cards and paginator for one feed page.
pub fn feed_page(page: &Page<PostEntry>) -> (Vec<PostCardView>, PaginatorView) {
    let posts = page.items.iter().map(PostCardView::from).collect();
    (posts, PaginatorView::from(&page.window))
}

pub struct GroupView {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<&GroupRecord> for GroupView {
    fn from(group: &GroupRecord) -> Self {
        Self {
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        }
    }
}

pub struct CommentView {
    pub author: String,
    pub text: String,
    pub published: String,
}

impl From<&CommentEntry> for CommentView {
    fn from(entry: &CommentEntry) -> Self {
        Self {
            author: entry.author.username.clone(),
            text: entry.comment.text.clone(),
            published: format_human_date(entry.comment.created_at),
        }
    }
}

pub struct GroupChoiceView {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

/// Option list for the group select, marking the submitted or stored value.
pub fn group_choices(groups: &[GroupRecord], selected: Option<&str>) -> Vec<GroupChoiceView> {
    let selected = selected.map(str::trim).unwrap_or("");
    groups
        .iter()
        .map(|group| GroupChoiceView {
            id: group.id,
            title: group.title.clone(),
            selected: group.id.to_string() == selected,
        })
        .collect()
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub chrome: ChromeView,
    pub posts: Vec<PostCardView>,
    pub paginator: PaginatorView,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub chrome: ChromeView,
    pub group: GroupView,
    pub posts: Vec<PostCardView>,
    pub paginator: PaginatorView,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub chrome: ChromeView,
    pub author: String,
    pub post_count: u64,
    pub follower_count: u64,
    /// `None` hides the follow controls.
    pub following: Option<bool>,
    pub posts: Vec<PostCardView>,
    pub paginator: PaginatorView,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub chrome: ChromeView,
    pub post: PostCardView,
    pub author_post_count: u64,
    pub comments: Vec<CommentView>,
    pub can_edit: bool,
    pub can_comment: bool,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub chrome: ChromeView,
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub groups: Vec<GroupChoiceView>,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowTemplate {
    pub chrome: ChromeView,
    pub posts: Vec<PostCardView>,
    pub paginator: PaginatorView,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub chrome: ChromeView,
    pub path: String,
}
