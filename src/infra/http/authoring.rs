//! Post authoring handlers: create, edit, delete and comment.

use axum::{
    Form,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    application::{
        error::HttpError,
        posts::{FieldErrors, PostError, PostInput},
    },
    domain::entities::AuthorRecord,
    presentation::views::{
        PostFormTemplate, group_choices, render_not_found_response, render_template_response,
    },
};

use super::{CurrentUser, HttpState, post_location, profile_location, public::parse_post_id};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PostForm {
    text: String,
    group: Option<String>,
}

impl From<PostForm> for PostInput {
    fn from(form: PostForm) -> Self {
        Self {
            text: form.text,
            group: form.group,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CommentForm {
    text: String,
}

/// Values shown when the form is rendered.
struct FormState {
    action: String,
    is_edit: bool,
    text: String,
    group: Option<String>,
    errors: FieldErrors,
}

async fn render_form(state: &HttpState, author: &AuthorRecord, form: FormState) -> Response {
    let groups = match state.posts.group_choices().await {
        Ok(groups) => groups,
        Err(err) => return HttpError::from(err).into_response(),
    };

    let template = PostFormTemplate {
        chrome: state.chrome(Some(author)),
        is_edit: form.is_edit,
        action: form.action,
        text: form.text,
        groups: group_choices(&groups, form.group.as_deref()),
        errors: form.errors,
    };
    render_template_response(template, StatusCode::OK)
}

pub(super) async fn post_create_form(
    State(state): State<HttpState>,
    CurrentUser(author): CurrentUser,
) -> Response {
    let form = FormState {
        action: "/create/".to_string(),
        is_edit: false,
        text: String::new(),
        group: None,
        errors: FieldErrors::default(),
    };
    render_form(&state, &author, form).await
}

pub(super) async fn post_create(
    State(state): State<HttpState>,
    CurrentUser(author): CurrentUser,
    Form(form): Form<PostForm>,
) -> Response {
    let submitted = (form.text.clone(), form.group.clone());
    match state.posts.create(&author, form.into()).await {
        Ok(_) => Redirect::to(&profile_location(&author.username)).into_response(),
        Err(PostError::Invalid(errors)) => {
            let (text, group) = submitted;
            let form = FormState {
                action: "/create/".to_string(),
                is_edit: false,
                text,
                group,
                errors,
            };
            render_form(&state, &author, form).await
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub(super) async fn post_edit_form(
    State(state): State<HttpState>,
    CurrentUser(editor): CurrentUser,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Response {
    let Some(post_id) = parse_post_id(&raw_id) else {
        return render_not_found_response(state.chrome(Some(&editor)), uri.path());
    };

    match state.posts.load_for_edit(&editor, post_id).await {
        Ok(entry) => {
            let form = FormState {
                action: format!("/posts/{post_id}/edit/"),
                is_edit: true,
                text: entry.post.text,
                group: entry.post.group_id.map(|id| id.to_string()),
                errors: FieldErrors::default(),
            };
            render_form(&state, &editor, form).await
        }
        Err(err) => post_error_to_response(&state, &editor, err, &uri),
    }
}

pub(super) async fn post_edit(
    State(state): State<HttpState>,
    CurrentUser(editor): CurrentUser,
    Path(raw_id): Path<String>,
    uri: Uri,
    Form(form): Form<PostForm>,
) -> Response {
    let Some(post_id) = parse_post_id(&raw_id) else {
        return render_not_found_response(state.chrome(Some(&editor)), uri.path());
    };

    let submitted = (form.text.clone(), form.group.clone());
    match state.posts.edit(&editor, post_id, form.into()).await {
        Ok(post) => Redirect::to(&post_location(post.id)).into_response(),
        Err(PostError::Invalid(errors)) => {
            let (text, group) = submitted;
            let form = FormState {
                action: format!("/posts/{post_id}/edit/"),
                is_edit: true,
                text,
                group,
                errors,
            };
            render_form(&state, &editor, form).await
        }
        Err(err) => post_error_to_response(&state, &editor, err, &uri),
    }
}

pub(super) async fn add_comment(
    State(state): State<HttpState>,
    CurrentUser(author): CurrentUser,
    Path(raw_id): Path<String>,
    uri: Uri,
    Form(form): Form<CommentForm>,
) -> Response {
    let Some(post_id) = parse_post_id(&raw_id) else {
        return render_not_found_response(state.chrome(Some(&author)), uri.path());
    };

    match state.posts.comment(&author, post_id, &form.text).await {
        Ok(comment) => {
            if comment.is_none() {
                debug!(target = "yatube::http::posts", post_id, "blank comment ignored");
            }
            Redirect::to(&post_location(post_id)).into_response()
        }
        Err(err) => post_error_to_response(&state, &author, err, &uri),
    }
}

pub(super) async fn post_delete(
    State(state): State<HttpState>,
    CurrentUser(editor): CurrentUser,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Response {
    let Some(post_id) = parse_post_id(&raw_id) else {
        return render_not_found_response(state.chrome(Some(&editor)), uri.path());
    };

    match state.posts.delete(&editor, post_id).await {
        Ok(()) => Redirect::to(&profile_location(&editor.username)).into_response(),
        Err(err) => post_error_to_response(&state, &editor, err, &uri),
    }
}

fn post_error_to_response(
    state: &HttpState,
    viewer: &AuthorRecord,
    err: PostError,
    uri: &Uri,
) -> Response {
    match err {
        PostError::NotFound(_) => render_not_found_response(state.chrome(Some(viewer)), uri.path()),
        PostError::NotAuthor { post_id } => Redirect::to(&post_location(post_id)).into_response(),
        other => HttpError::from(other).into_response(),
    }
}
