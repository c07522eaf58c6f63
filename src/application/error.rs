use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{
        authors::IdentityError, feed::FeedError, follow::FollowError, groups::GroupError,
        posts::PostError,
    },
    config::LoadError,
    infra::error::InfraError,
};

/// Diagnostic chain attached to error responses for the response logger.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Plain-text error response with a public message and an attached report.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

fn internal(source: &'static str, error: &dyn StdError) -> HttpError {
    HttpError::from_error(
        source,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
        error,
    )
}

impl From<FeedError> for HttpError {
    fn from(error: FeedError) -> Self {
        const SOURCE: &str = "application::error::feed_error_to_http_error";
        match error {
            FeedError::UnknownGroup(_) | FeedError::UnknownAuthor(_) | FeedError::PostNotFound(_) => {
                HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, "Not found", &error)
            }
            FeedError::Repo(err) => internal(SOURCE, &err),
        }
    }
}

impl From<PostError> for HttpError {
    fn from(error: PostError) -> Self {
        const SOURCE: &str = "application::error::post_error_to_http_error";
        match error {
            PostError::Repo(err) => internal(SOURCE, &err),
            other => HttpError::from_error(SOURCE, StatusCode::BAD_REQUEST, "Bad request", &other),
        }
    }
}

impl From<FollowError> for HttpError {
    fn from(error: FollowError) -> Self {
        const SOURCE: &str = "application::error::follow_error_to_http_error";
        match error {
            FollowError::Repo(err) => internal(SOURCE, &err),
            other => HttpError::from_error(SOURCE, StatusCode::BAD_REQUEST, "Bad request", &other),
        }
    }
}

impl From<IdentityError> for HttpError {
    fn from(error: IdentityError) -> Self {
        const SOURCE: &str = "application::error::identity_error_to_http_error";
        match error {
            IdentityError::InvalidUsername(_) => {
                HttpError::from_error(SOURCE, StatusCode::BAD_REQUEST, "Invalid identity", &error)
            }
            IdentityError::Repo(err) => internal(SOURCE, &err),
        }
    }
}

/// Top-level failure of a binary command.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::RepoError;

    #[test]
    fn error_report_collects_source_chain() {
        let error = FeedError::Repo(RepoError::Timeout);
        let report = ErrorReport::from_error("test", StatusCode::INTERNAL_SERVER_ERROR, &error);
        assert_eq!(report.messages.first().map(String::as_str), Some("database timeout"));
    }

    #[test]
    fn feed_lookups_map_to_not_found() {
        let error = HttpError::from(FeedError::UnknownGroup("cats".to_string()));
        assert_eq!(error.status(), StatusCode::NOT_FOUND);

        let error = HttpError::from(FeedError::Repo(RepoError::Timeout));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn storage_failures_behind_writes_map_to_internal_error() {
        let error = HttpError::from(PostError::Repo(RepoError::Timeout));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = HttpError::from(FollowError::Repo(RepoError::Timeout));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
