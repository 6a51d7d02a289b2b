//! Shared types used across all modules.
//!
//! The upstream records (users, posts, comments) plus the small enums the
//! view pipeline is configured with. Other modules import from here rather
//! than reaching into each other's internals.

pub mod post;
pub mod user;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use post::{Comment, Post, PostDetail};
pub use user::{Company, User};

/// Identifier of a user, post or comment as issued by the upstream API.
///
/// Upstream ids start at 1; `0` stands for "no identifier" and is rejected
/// by every guarded lookup.
pub type Id = u64;

/// Returns the id if it is usable as a lookup key.
pub fn present(id: Id) -> Option<Id> {
    (id != 0).then_some(id)
}

/// When comments for a post are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommentLoading {
    /// Fetch every post's comments while building the post list.
    #[default]
    Eager,
    /// Fetch a post's comments the first time its section is expanded.
    Lazy,
}

impl fmt::Display for CommentLoading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentLoading::Eager => write!(f, "eager"),
            CommentLoading::Lazy => write!(f, "lazy"),
        }
    }
}

impl std::str::FromStr for CommentLoading {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eager" => Ok(CommentLoading::Eager),
            "lazy" => Ok(CommentLoading::Lazy),
            other => Err(format!(
                "unsupported comment loading mode: '{other}'. Supported: eager, lazy"
            )),
        }
    }
}
