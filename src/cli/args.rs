//! Clap argument types.

use clap::{Parser, ValueEnum};

use postview::config::Config;
use postview::constants::MAX_CONCURRENT_LIMIT;
use postview::models::{CommentLoading, Id};
use postview::orchestrator::PageSnapshot;

/// Browse users, their posts and comments from a REST API.
#[derive(Parser, Debug)]
#[command(name = "postview", version = postview::constants::VERSION)]
pub struct Cli {
    /// Base URL of the upstream API.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// When comments are fetched: with the post list, or on first expand.
    #[arg(long, global = true, value_enum)]
    pub comments: Option<CommentLoading>,

    /// Maximum number of concurrent detail requests (1 to 64).
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(u64).range(1..=MAX_CONCURRENT_LIMIT as u64)
    )]
    pub max_concurrent: Option<u64>,

    /// Suppress progress output.
    #[arg(long, short = 'q', global = true, default_value_t = false)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// List users.
    Users,

    /// Show the posts of one user.
    Posts(PostsArgs),

    /// Browse interactively: select users and toggle comments from stdin.
    Browse,

    /// Print version and build information.
    Version,
}

/// Arguments for the `posts` subcommand.
#[derive(Parser, Debug)]
pub struct PostsArgs {
    /// User whose posts to show (default: the configured default user).
    #[arg(long)]
    pub user: Option<String>,

    /// Post whose comments to expand. May be repeated.
    #[arg(long, value_name = "POST_ID")]
    pub expand: Vec<Id>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Html,
    Json,
}

impl OutputFormat {
    /// Render a page using the renderer for this format.
    pub fn render(&self, page: &PageSnapshot<'_>) -> String {
        use postview::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => postview::output::terminal::TerminalRenderer.render(page),
            OutputFormat::Html => postview::output::html::HtmlRenderer.render(page),
            OutputFormat::Json => postview::output::json::JsonRenderer.render(page),
        }
    }
}

impl Cli {
    /// Layer 1: apply CLI flags over the loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref url) = self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(mode) = self.comments {
            config.view.comments = mode;
        }
        if let Some(n) = self.max_concurrent {
            config.view.max_concurrent = usize::try_from(n)
                .unwrap_or(MAX_CONCURRENT_LIMIT)
                .min(MAX_CONCURRENT_LIMIT);
        }
    }

    /// Default log filter for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
