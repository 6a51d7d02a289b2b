//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! upstream URLs and the fixed UI strings so a rename only requires
//! changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "postview";

/// Crate version, from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple, exported by `build.rs`.
pub const TARGET: &str = env!("TARGET");

/// `User-Agent` header sent with every upstream request.
pub const USER_AGENT: &str = concat!("postview/", env!("CARGO_PKG_VERSION"));

/// Local config filename (e.g. `.postview.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".postview.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "postview";

/// Default upstream REST API.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// User selected when a selection event carries no usable value.
pub const DEFAULT_USER_ID: u64 = 1;

/// Default cap on concurrent per-post detail fetches.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Highest accepted value for the concurrent fetch cap.
pub const MAX_CONCURRENT_LIMIT: usize = 64;

// ── Document structure ──────────────────────────────────────────────

/// `id` of the user picker.
pub const SELECT_MENU_ID: &str = "selectMenu";

/// Attribute correlating a toggle button with its comment section.
pub const POST_ID_ATTR: &str = "data-post-id";

/// Attribute recording whether a lazily loaded section has its comments.
pub const LOADED_ATTR: &str = "data-loaded";

/// Hidden marker class on comment sections.
pub const HIDE_CLASS: &str = "hide";

pub const SHOW_COMMENTS: &str = "Show Comments";
pub const HIDE_COMMENTS: &str = "Hide Comments";
pub const PLACEHOLDER_TEXT: &str = "Select an Employee to display their posts.";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_BASE_URL: &str = "POSTVIEW_BASE_URL";
pub const ENV_COMMENTS: &str = "POSTVIEW_COMMENTS";
pub const ENV_MAX_CONCURRENT: &str = "POSTVIEW_MAX_CONCURRENT";
pub const ENV_LOG: &str = "POSTVIEW_LOG";
