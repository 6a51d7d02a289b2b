//! Posts, comments, and the joined per-post record the renderer consumes.

use serde::{Deserialize, Serialize};

use super::{Id, User};

/// A post, as served by `GET /posts?userId=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub body: String,
}

/// A comment, as served by `GET /comments?postId=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub post_id: Id,
    pub name: String,
    pub email: String,
    pub body: String,
}

/// A post joined with what was fetched for it.
///
/// `author` and `comments` are `None` when the lookup produced no result
/// (or, for comments in lazy mode, when they have not been fetched yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: Option<User>,
    pub comments: Option<Vec<Comment>>,
}

impl PostDetail {
    pub fn new(post: Post) -> Self {
        Self {
            post,
            author: None,
            comments: None,
        }
    }
}
