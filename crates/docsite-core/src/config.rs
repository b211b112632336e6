//! Site configuration management.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    markup::SanitizePolicy,
    versions::{VersionConfig, VersionEntry, VersionFilter},
};

/// Main configuration structure for docsite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Table of contents settings.
    #[serde(default)]
    pub toc: TocConfig,

    /// Version selector settings.
    #[serde(default)]
    pub versions: VersionConfig,

    /// Search result settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Feedback widget settings.
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base path the docs are served under (e.g., "/docs").
    #[serde(default)]
    pub base_path: String,

    /// Published branches offered in the version selector.
    #[serde(default)]
    pub branches: Vec<String>,
}

/// Table of contents configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocConfig {
    /// Left padding of top-level entries, in rem.
    #[serde(default = "default_indent_base")]
    pub indent_base: f32,

    /// Extra left padding per level, in rem.
    #[serde(default = "default_indent_step")]
    pub indent_step: f32,

    /// Tooltip text of the advisory icon.
    #[serde(default = "default_icon_tooltip")]
    pub icon_tooltip: String,
}

/// Search result configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Characters kept on each side of the first match in previews.
    #[serde(default = "default_snippet_radius")]
    pub snippet_radius: usize,

    /// Maximum number of results shown.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Markup allowed in titles and previews.
    #[serde(default)]
    pub sanitize: SanitizePolicy,
}

/// Feedback widget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Whether the widget is shown.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Question shown next to the emoji.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Message shown after a rating was picked.
    #[serde(default = "default_thanks")]
    pub thanks: String,
}

// Default value functions
fn default_indent_base() -> f32 {
    0.5
}

fn default_indent_step() -> f32 {
    1.0
}

fn default_icon_tooltip() -> String {
    "This page describes a feature that is still experimental.".to_string()
}

fn default_snippet_radius() -> usize {
    80
}

fn default_max_results() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_prompt() -> String {
    "Was this page helpful?".to_string()
}

fn default_thanks() -> String {
    "Thanks for your feedback!".to_string()
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            indent_base: default_indent_base(),
            indent_step: default_indent_step(),
            icon_tooltip: default_icon_tooltip(),
        }
    }
}

impl TocConfig {
    /// Left padding of an entry at `level`, in rem. Linear in depth.
    pub fn indent(&self, level: usize) -> f32 {
        self.indent_base + self.indent_step * level.saturating_sub(1) as f32
    }
}

impl SiteConfig {
    /// `path` below the base path.
    pub fn path_for(&self, path: &str) -> String {
        let base = self.base_path.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// `path` with the base path removed, unchanged when outside of it.
    pub fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        let base = self.base_path.trim_end_matches('/');
        if base.is_empty() {
            return path;
        }
        match path.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            snippet_radius: default_snippet_radius(),
            max_results: default_max_results(),
            sanitize: SanitizePolicy::default(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prompt: default_prompt(),
            thanks: default_thanks(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration using the config crate, with `DOCSITE__` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("DOCSITE").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text, e.g. a file embedded in the bundle.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.toc.indent_base < 0.0 || self.toc.indent_step < 0.0 {
            return Err(CoreError::config("toc indentation cannot be negative"));
        }

        VersionFilter::new(&self.versions)?;

        if self.site.base_path.ends_with('/') {
            tracing::warn!("site.base_path should not have a trailing slash");
        }

        Ok(())
    }

    /// Get the site path for a slug.
    pub fn path_for(&self, slug: &str) -> String {
        self.site.path_for(slug)
    }

    /// Link to `slug` inside `version`, or the unversioned path without one.
    pub fn link_for(&self, version: Option<&VersionEntry>, slug: &str) -> String {
        match version {
            Some(entry) => self.site.path_for(&self.versions.url_for(entry, slug)),
            None => self.site.path_for(slug),
        }
    }
}
