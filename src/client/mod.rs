//! Upstream REST access.
//!
//! [`PostsApi`] is the seam between the view pipeline and the network: the
//! reqwest-backed [`http::HttpClient`] implements it for real use, tests
//! implement it with canned data. [`Fetcher`] sits in front of any
//! implementation and collapses every failure to "no result".

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Comment, Id, Post, User, present};

/// Errors from an upstream lookup.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("{url} returned HTTP {status}")]
    BadStatus { url: String, status: u16 },

    #[error("missing {0}")]
    MissingInput(&'static str),

    #[error("no {what} with id {id}")]
    NotFound { what: &'static str, id: Id },

    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Read-only access to users, posts and comments.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// `GET /users`.
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// `GET /users?id={id}`; the first match is the user.
    async fn get_user(&self, id: Id) -> Result<User, ApiError>;

    /// `GET /posts?userId={id}`.
    async fn list_posts_by_user(&self, user_id: Id) -> Result<Vec<Post>, ApiError>;

    /// `GET /comments?postId={id}`.
    async fn list_comments_by_post(&self, post_id: Id) -> Result<Vec<Comment>, ApiError>;
}

/// Failure-swallowing front for a [`PostsApi`].
///
/// Every lookup yields `Some` on success and `None` otherwise; the cause is
/// logged and never surfaced. Zero ids short-circuit before the API is called.
#[derive(Clone)]
pub struct Fetcher {
    api: Arc<dyn PostsApi>,
}

impl Fetcher {
    pub fn new(api: Arc<dyn PostsApi>) -> Self {
        Self { api }
    }

    pub async fn users(&self) -> Option<Vec<User>> {
        settle("list users", self.api.list_users().await)
    }

    pub async fn user(&self, id: Id) -> Option<User> {
        let Some(id) = present(id) else {
            return settle("get user", Err(ApiError::MissingInput("user id")));
        };
        settle("get user", self.api.get_user(id).await)
    }

    pub async fn posts_by_user(&self, user_id: Id) -> Option<Vec<Post>> {
        let Some(user_id) = present(user_id) else {
            return settle("list posts", Err(ApiError::MissingInput("user id")));
        };
        settle("list posts", self.api.list_posts_by_user(user_id).await)
    }

    pub async fn comments_by_post(&self, post_id: Id) -> Option<Vec<Comment>> {
        let Some(post_id) = present(post_id) else {
            return settle("list comments", Err(ApiError::MissingInput("post id")));
        };
        settle("list comments", self.api.list_comments_by_post(post_id).await)
    }
}

fn settle<T>(operation: &str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e @ ApiError::MissingInput(_)) => {
            tracing::debug!(operation, "skipped: {e}");
            None
        }
        Err(e) => {
            tracing::warn!(operation, "{e}");
            None
        }
    }
}
