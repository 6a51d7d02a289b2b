//! Terminal renderer: styled flowing text, one block per post.
//!
//! Comments are listed only under expanded posts, mirroring what the page
//! shows.

use colored::Colorize;

use crate::constants::PLACEHOLDER_TEXT;
use crate::models::PostDetail;
use crate::orchestrator::PageSnapshot;
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, page: &PageSnapshot<'_>) -> String {
        let view = page.view;
        let Some(user_id) = view.selected_user.filter(|_| !view.posts.is_empty()) else {
            return format!("  {}\n", PLACEHOLDER_TEXT.dimmed());
        };

        let mut output = String::new();
        let heading = match view.users.iter().find(|u| u.id == user_id) {
            Some(user) => format!("Posts by {} (user {})", user.name, user_id),
            None => format!("Posts for user {user_id}"),
        };
        output.push_str(&format!(" {}\n\n", heading.bold()));

        for detail in &view.posts {
            render_post(&mut output, detail, view.is_expanded(detail.post.id));
            output.push('\n');
        }

        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        let count = view.posts.len();
        output.push_str(&format!(
            " {} {}, {} expanded\n",
            count.to_string().bold(),
            if count == 1 { "post" } else { "posts" },
            view.expanded.len().to_string().cyan().bold(),
        ));
        output
    }
}

fn render_post(output: &mut String, detail: &PostDetail, expanded: bool) {
    let post = &detail.post;
    output.push_str(&format!(" {} {}\n", "▸".cyan().bold(), post.title.bold()));
    output.push_str(&format!("   {}\n", post.body));
    output.push_str(&format!("   {}\n", format!("Post ID: {}", post.id).dimmed()));
    match &detail.author {
        Some(author) => {
            output.push_str(&format!("   {}\n", author.byline()));
            if !author.company.catch_phrase.is_empty() {
                output.push_str(&format!("   {}\n", author.company.catch_phrase.italic()));
            }
        }
        None => output.push_str(&format!("   {}\n", "Author: unknown".yellow())),
    }

    if !expanded {
        output.push_str(&format!("   {} Show Comments\n", "→".cyan()));
        return;
    }
    output.push_str(&format!("   {} Hide Comments\n", "↓".cyan()));
    match detail.comments.as_deref() {
        Some([]) | None => output.push_str(&format!("     {}\n", "no comments".dimmed())),
        Some(comments) => {
            for comment in comments {
                output.push_str(&format!("     {}\n", comment.name.bold()));
                output.push_str(&format!("     {}\n", comment.body));
                output.push_str(&format!("     {}\n", format!("From: {}", comment.email).dimmed()));
            }
        }
    }
}
