//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.postview.toml` in the working directory
//! 4. `~/.config/postview/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT, DEFAULT_USER_ID, ENV_BASE_URL, ENV_COMMENTS,
    ENV_MAX_CONCURRENT, MAX_CONCURRENT_LIMIT, USER_AGENT,
};
use crate::env::Env;
use crate::models::{CommentLoading, Id};
use crate::orchestrator::PageOptions;
use crate::orchestrator::details::DetailOptions;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub view: ViewConfig,
}

/// Upstream API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// How posts and comments are presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub comments: CommentLoading,
    pub max_concurrent: usize,
    pub default_user: Id,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            comments: CommentLoading::default(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            default_user: DEFAULT_USER_ID,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, then the local config in `work_dir`, then
    /// applies environment variable overrides.
    pub fn load(work_dir: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let global_path = Self::global_config_path();
        Self::load_with_global(global_path.as_deref(), work_dir, env)
    }

    /// Like [`Config::load`], with the global config file given explicitly.
    ///
    /// `None` skips the global layer.
    pub fn load_with_global(
        global: Option<&Path>,
        work_dir: Option<&Path>,
        env: &Env,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = global {
            if global_path.exists() {
                let global = Self::load_file(global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: local config
        if let Some(dir) = work_dir {
            let local_path = dir.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_api = ApiConfig::default();
        if other.api.base_url != default_api.base_url {
            self.api.base_url = other.api.base_url;
        }
        if other.api.user_agent != default_api.user_agent {
            self.api.user_agent = other.api.user_agent;
        }

        let default_view = ViewConfig::default();
        if other.view.comments != default_view.comments {
            self.view.comments = other.view.comments;
        }
        if other.view.max_concurrent != default_view.max_concurrent {
            self.view.max_concurrent = other.view.max_concurrent;
        }
        if other.view.default_user != default_view.default_user {
            self.view.default_user = other.view.default_user;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.var(ENV_BASE_URL) {
            self.api.base_url = val.trim().to_string();
        }
        match env.parsed::<CommentLoading>(ENV_COMMENTS) {
            Some(Ok(mode)) => self.view.comments = mode,
            Some(Err(raw)) => tracing::warn!("ignoring invalid {ENV_COMMENTS} value: {raw}"),
            None => {}
        }
        match env.parsed::<usize>(ENV_MAX_CONCURRENT) {
            Some(Ok(n)) if (1..=MAX_CONCURRENT_LIMIT).contains(&n) => self.view.max_concurrent = n,
            Some(Ok(_)) | Some(Err(_)) => {
                let raw = env.var(ENV_MAX_CONCURRENT).unwrap_or_default();
                tracing::warn!("ignoring invalid {ENV_MAX_CONCURRENT} value: {raw}");
            }
            None => {}
        }
    }

    /// Page settings derived from the `[view]` section.
    ///
    /// `max_concurrent` is clamped to `1..=MAX_CONCURRENT_LIMIT`.
    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            details: DetailOptions {
                comments: self.view.comments,
                max_concurrent: self.view.max_concurrent.clamp(1, MAX_CONCURRENT_LIMIT),
            },
            default_user: self.view.default_user,
        }
    }
}
