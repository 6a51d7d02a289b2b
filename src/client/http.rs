//! reqwest-backed [`PostsApi`] for JSONPlaceholder-style servers.
//!
//! Single attempt per call: no retry, no backoff. Any non-2xx status is a
//! [`ApiError::BadStatus`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{ApiError, PostsApi};
use crate::models::{Comment, Id, Post, User, present};

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Build a client for `base_url` (trailing slashes are ignored).
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{path}` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GET");

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::BadStatus {
                url,
                status: status.as_u16(),
            });
        }

        resp.json::<T>().await.map_err(|e| ApiError::Decode {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PostsApi for HttpClient {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/users").await
    }

    async fn get_user(&self, id: Id) -> Result<User, ApiError> {
        let id = present(id).ok_or(ApiError::MissingInput("user id"))?;
        let users: Vec<User> = self.get_json(&format!("/users?id={id}")).await?;
        users
            .into_iter()
            .next()
            .ok_or(ApiError::NotFound { what: "user", id })
    }

    async fn list_posts_by_user(&self, user_id: Id) -> Result<Vec<Post>, ApiError> {
        let user_id = present(user_id).ok_or(ApiError::MissingInput("user id"))?;
        self.get_json(&format!("/posts?userId={user_id}")).await
    }

    async fn list_comments_by_post(&self, post_id: Id) -> Result<Vec<Comment>, ApiError> {
        let post_id = present(post_id).ok_or(ApiError::MissingInput("post id"))?;
        self.get_json(&format!("/comments?postId={post_id}")).await
    }
}
