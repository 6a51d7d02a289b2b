//! Concurrent per-post detail loading.
//!
//! Authors and comments for a post list are independent lookups, so they
//! are fetched in parallel (bounded by a semaphore) and joined back into
//! the input order. Each distinct author is fetched once.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::client::Fetcher;
use crate::models::{CommentLoading, Comment, Id, Post, PostDetail, User};
use crate::progress::{ProgressTracker, TaskStatus};

/// How post details are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailOptions {
    pub comments: CommentLoading,
    /// Upper bound on in-flight requests, clamped to the semaphore's range.
    pub max_concurrent: usize,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            comments: CommentLoading::default(),
            max_concurrent: crate::constants::DEFAULT_MAX_CONCURRENT,
        }
    }
}

enum Fetched {
    Author(Id, Option<User>),
    Comments(usize, Option<Vec<Comment>>),
}

/// Fetches authors (and, when eager, comments) for a post list.
pub struct DetailLoader {
    fetcher: Fetcher,
    options: DetailOptions,
    progress: Arc<ProgressTracker>,
}

impl DetailLoader {
    pub fn new(fetcher: Fetcher, options: DetailOptions, progress: Arc<ProgressTracker>) -> Self {
        Self {
            fetcher,
            options,
            progress,
        }
    }

    pub fn options(&self) -> DetailOptions {
        self.options
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Load details for `posts`; the result has one entry per post, in order.
    pub async fn load(&self, posts: &[Post]) -> Vec<PostDetail> {
        let eager = self.options.comments == CommentLoading::Eager;
        let author_ids: IndexSet<Id> = posts.iter().map(|p| p.user_id).collect();

        let mut labels: Vec<String> = author_ids.iter().map(|id| author_label(*id)).collect();
        if eager {
            labels.extend(posts.iter().map(|p| comments_label(p.id)));
        }
        self.progress.begin(
            &format!("Loading details for {} post(s)", posts.len()),
            &labels,
        );

        let permits = self.options.max_concurrent.clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut join_set = JoinSet::new();

        for user_id in author_ids {
            let fetcher = self.fetcher.clone();
            let sem = Arc::clone(&semaphore);
            let progress = Arc::clone(&self.progress);
            join_set.spawn(async move {
                let label = author_label(user_id);
                let Ok(_permit) = sem.acquire().await else {
                    return Fetched::Author(user_id, None);
                };
                progress.update(&label, TaskStatus::InProgress);
                let user = fetcher.user(user_id).await;
                progress.update(&label, settled(user.is_some()));
                Fetched::Author(user_id, user)
            });
        }

        if eager {
            for (index, post) in posts.iter().enumerate() {
                let fetcher = self.fetcher.clone();
                let sem = Arc::clone(&semaphore);
                let progress = Arc::clone(&self.progress);
                let post_id = post.id;
                join_set.spawn(async move {
                    let label = comments_label(post_id);
                    let Ok(_permit) = sem.acquire().await else {
                        return Fetched::Comments(index, None);
                    };
                    progress.update(&label, TaskStatus::InProgress);
                    let comments = fetcher.comments_by_post(post_id).await;
                    progress.update(&label, settled(comments.is_some()));
                    Fetched::Comments(index, comments)
                });
            }
        }

        let mut authors: HashMap<Id, User> = HashMap::new();
        let mut comments: Vec<Option<Vec<Comment>>> = vec![None; posts.len()];
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(Fetched::Author(id, Some(user))) => {
                    authors.insert(id, user);
                }
                Ok(Fetched::Author(_, None)) => {}
                Ok(Fetched::Comments(index, fetched)) => comments[index] = fetched,
                Err(e) => tracing::warn!("detail fetch task panicked: {e}"),
            }
        }
        self.progress.finish();

        posts
            .iter()
            .zip(comments)
            .map(|(post, comments)| PostDetail {
                author: authors.get(&post.user_id).cloned(),
                comments,
                post: post.clone(),
            })
            .collect()
    }
}

fn author_label(user_id: Id) -> String {
    format!("author {user_id}")
}

fn comments_label(post_id: Id) -> String {
    format!("comments for post {post_id}")
}

fn settled(ok: bool) -> TaskStatus {
    if ok {
        TaskStatus::Done
    } else {
        TaskStatus::Failed("no result".to_string())
    }
}
