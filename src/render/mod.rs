//! View builders.
//!
//! Everything here except [`build_post_fragment`] is pure: data in,
//! detached [`VNode`]s out. Nothing is attached to a live document.

use crate::constants::{HIDE_CLASS, LOADED_ATTR, PLACEHOLDER_TEXT, POST_ID_ATTR, SHOW_COMMENTS};
use crate::dom::{Fragment, VNode};
use crate::models::{Comment, CommentLoading, Id, Post, PostDetail, User};
use crate::orchestrator::details::DetailLoader;

/// One `<option>` per user, value = id, label = name. `None` in, `None` out.
pub fn build_option_list(users: Option<&[User]>) -> Option<Vec<VNode>> {
    let users = users?;
    Some(
        users
            .iter()
            .map(|u| VNode::with_text("option", u.name.as_str()).attr("value", u.id.to_string()))
            .collect(),
    )
}

/// One `<article>` per comment: name heading, body, and sender line.
pub fn build_comment_fragment(comments: Option<&[Comment]>) -> Option<Fragment> {
    let comments = comments?;
    Some(
        comments
            .iter()
            .map(|c| {
                VNode::element("article")
                    .child(VNode::with_text("h3", c.name.as_str()))
                    .child(VNode::with_text("p", c.body.as_str()))
                    .child(VNode::with_text("p", format!("From: {}", c.email)))
            })
            .collect(),
    )
}

/// The initially hidden `<section class="comments hide">` for a post.
///
/// In lazy mode a section built without comments is flagged
/// `data-loaded="false"` so the first expand knows to fetch them.
pub fn build_comment_section(
    post_id: Id,
    comments: Option<&[Comment]>,
    loading: CommentLoading,
) -> VNode {
    let mut section = VNode::element("section")
        .attr(POST_ID_ATTR, post_id.to_string())
        .class("comments")
        .class(HIDE_CLASS);
    if loading == CommentLoading::Lazy {
        let loaded = if comments.is_some() { "true" } else { "false" };
        section = section.attr(LOADED_ATTR, loaded);
    }
    match build_comment_fragment(comments) {
        Some(fragment) => section.children(fragment.nodes),
        None => section,
    }
}

/// One post: title, body, id line, author lines, toggle button, comments.
pub fn build_post_article(detail: &PostDetail, loading: CommentLoading) -> VNode {
    let post: &Post = &detail.post;
    let (byline, catch_phrase) = match &detail.author {
        Some(author) => (author.byline(), author.company.catch_phrase.clone()),
        None => ("Author: unknown".to_string(), String::new()),
    };

    VNode::element("article")
        .child(VNode::with_text("h2", post.title.as_str()))
        .child(VNode::with_text("p", post.body.as_str()))
        .child(VNode::with_text("p", format!("Post ID: {}", post.id)))
        .child(VNode::with_text("p", byline))
        .child(VNode::with_text("p", catch_phrase))
        .child(VNode::with_text("button", SHOW_COMMENTS).attr(POST_ID_ATTR, post.id.to_string()))
        .child(build_comment_section(
            post.id,
            detail.comments.as_deref(),
            loading,
        ))
}

/// Articles for every post, in input order.
pub fn post_fragment(details: &[PostDetail], loading: CommentLoading) -> Fragment {
    details
        .iter()
        .map(|d| build_post_article(d, loading))
        .collect()
}

/// Articles for a post list, with the details they were built from.
#[derive(Debug, Clone)]
pub struct PostView {
    pub fragment: Fragment,
    pub details: Vec<PostDetail>,
}

/// Fetch what each post needs, then build its articles.
///
/// `None` when there are no posts to render.
pub async fn build_post_fragment(loader: &DetailLoader, posts: Option<&[Post]>) -> Option<PostView> {
    let posts = posts?;
    let details = loader.load(posts).await;
    Some(PostView {
        fragment: post_fragment(&details, loader.options().comments),
        details,
    })
}

/// `<p class="default-text">` shown when there is nothing to list.
pub fn placeholder() -> VNode {
    VNode::with_text("p", PLACEHOLDER_TEXT).class("default-text")
}
