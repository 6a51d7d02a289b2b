//! Fixture-backed upstream shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use postview::client::{ApiError, Fetcher, PostsApi};
use postview::models::{Comment, CommentLoading, Id, Post, User};
use postview::orchestrator::details::DetailOptions;
use postview::orchestrator::{Page, PageOptions};
use postview::progress::ProgressTracker;

fn fixture<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let path = format!("{}/tests/fixtures/api/{name}", env!("CARGO_MANIFEST_DIR"));
    let content = std::fs::read_to_string(&path).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Serves `tests/fixtures/api/*.json`, filtered the way the real API does.
pub struct FixtureApi {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    /// Post ids whose comments answer with HTTP 500.
    pub failing_comments: HashSet<Id>,
    pub requests: Mutex<Vec<String>>,
    pub user_calls: AtomicUsize,
}

impl FixtureApi {
    pub fn new() -> Self {
        Self {
            users: fixture("users.json"),
            posts: fixture("posts.json"),
            comments: fixture("comments.json"),
            failing_comments: HashSet::new(),
            requests: Mutex::new(Vec::new()),
            user_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_comments_for(mut self, post_id: Id) -> Self {
        self.failing_comments.insert(post_id);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, path: String) {
        self.requests.lock().unwrap().push(path);
    }
}

#[async_trait]
impl PostsApi for FixtureApi {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.record("/users".into());
        Ok(self.users.clone())
    }

    async fn get_user(&self, id: Id) -> Result<User, ApiError> {
        self.record(format!("/users?id={id}"));
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(ApiError::NotFound { what: "user", id })
    }

    async fn list_posts_by_user(&self, user_id: Id) -> Result<Vec<Post>, ApiError> {
        self.record(format!("/posts?userId={user_id}"));
        Ok(self.posts.iter().filter(|p| p.user_id == user_id).cloned().collect())
    }

    async fn list_comments_by_post(&self, post_id: Id) -> Result<Vec<Comment>, ApiError> {
        let path = format!("/comments?postId={post_id}");
        self.record(path.clone());
        if self.failing_comments.contains(&post_id) {
            return Err(ApiError::BadStatus {
                url: format!("http://fixture{path}"),
                status: 500,
            });
        }
        Ok(self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}

pub fn page_with(api: Arc<FixtureApi>, comments: CommentLoading) -> Page {
    let options = PageOptions {
        details: DetailOptions {
            comments,
            max_concurrent: 4,
        },
        ..Default::default()
    };
    Page::new(Fetcher::new(api), options, Arc::new(ProgressTracker::silent()))
}
