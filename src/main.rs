//! postview: browse users, their posts and comments from a REST API.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use postview::client::Fetcher;
use postview::client::http::HttpClient;
use postview::config::Config;
use postview::constants;
use postview::env::Env;
use postview::models::User;
use postview::orchestrator::Page;
use postview::progress::ProgressTracker;

use std::io::{IsTerminal, Write};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::args::{Cli, Command, OutputFormat, PostsArgs};
use cli::browse::{self, BrowseCommand};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    install_tracing(&cli);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn install_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_env(constants::ENV_LOG)
        .unwrap_or_else(|_| cli.log_level().into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Users => run_users(&load_config(&cli)?).await,
        Command::Posts(ref args) => run_posts(&load_config(&cli)?, args, cli.quiet).await,
        Command::Browse => run_browse(&load_config(&cli)?, cli.quiet).await,
        Command::Version => run_version(),
    }
}

/// Load layered config and apply CLI flags on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut config =
        Config::load(Some(&cwd), &Env::real()).context("failed to load configuration")?;
    cli.apply_to(&mut config);
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn build_fetcher(config: &Config) -> Result<Fetcher> {
    let client = HttpClient::new(&config.api.base_url, &config.api.user_agent)
        .context("failed to build HTTP client")?;
    Ok(Fetcher::new(Arc::new(client)))
}

fn build_page(config: &Config, show_progress: bool) -> Result<Page> {
    let progress = Arc::new(ProgressTracker::new(show_progress));
    Ok(Page::new(build_fetcher(config)?, config.page_options(), progress))
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// List users.
async fn run_users(config: &Config) -> Result<()> {
    let fetcher = build_fetcher(config)?;
    let Some(users) = fetcher.users().await else {
        bail!("could not fetch users from {}", config.api.base_url);
    };
    print_users(&users);
    Ok(())
}

fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    for user in users {
        println!(
            "  {:>3}  {}  {}",
            user.id.to_string().cyan(),
            user.name.bold(),
            format!("({})", user.company.name).dimmed(),
        );
    }
}

/// Select one user, expand the requested posts, print the page.
async fn run_posts(config: &Config, args: &PostsArgs, quiet: bool) -> Result<()> {
    // Progress only makes sense next to terminal output.
    let show_progress =
        !quiet && args.format == OutputFormat::Terminal && std::io::stderr().is_terminal();
    let mut page = build_page(config, show_progress)?;

    if page.init().await?.is_none() {
        tracing::warn!("user list unavailable; continuing without it");
    }
    let report = page
        .select_user(args.user.as_deref())
        .await
        .context("failed to render posts")?;
    tracing::info!(user_id = report.user_id, posts = report.post_count, "selected");

    for post_id in &args.expand {
        if page.click_post(*post_id).await.is_empty() {
            eprintln!("Warning: post {post_id} is not shown for user {}", report.user_id);
        }
    }

    print!("{}", args.format.render(&page.snapshot()));
    Ok(())
}

/// Interactive session over stdin.
async fn run_browse(config: &Config, quiet: bool) -> Result<()> {
    let show_progress = !quiet && std::io::stderr().is_terminal();
    let interactive = std::io::stdin().is_terminal();
    let mut page = build_page(config, show_progress)?;

    match page.init().await? {
        Some(n) => println!("{} users loaded. Type 'help' for commands.", n.to_string().bold()),
        None => eprintln!("Warning: could not load users from {}", config.api.base_url),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("{} ", "postview>".cyan().bold());
            let _ = std::io::stdout().flush();
        }
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let command = match browse::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };

        match command {
            BrowseCommand::Select(value) => {
                let report = page.select_user(value.as_deref()).await?;
                println!(
                    "{} user {}: {} post(s), {} handler(s) bound",
                    "✔".green().bold(),
                    report.user_id,
                    report.post_count,
                    report.bound.len(),
                );
            }
            BrowseCommand::Toggle(post_id) => {
                if page.click_post(post_id).await.is_empty() {
                    eprintln!("post {post_id} has no comments button on this page");
                } else if page.view().is_expanded(post_id) {
                    println!("comments for post {post_id} shown");
                } else {
                    println!("comments for post {post_id} hidden");
                }
            }
            BrowseCommand::Show => print!("{}", OutputFormat::Terminal.render(&page.snapshot())),
            BrowseCommand::Html => print!("{}", OutputFormat::Html.render(&page.snapshot())),
            BrowseCommand::Users => print_users(&page.view().users),
            BrowseCommand::Help => println!("{}", browse::HELP),
            BrowseCommand::Quit => break,
        }
    }
    Ok(())
}
