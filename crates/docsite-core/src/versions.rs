//! Version selector model.
//!
//! Turns the raw list of published branches into the entries of the version
//! dropdown and maps pages between versions.

use std::{cmp::Ordering, collections::HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Version selector settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionConfig {
    /// Branch published as the latest docs.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Label shown for the default branch.
    #[serde(default = "default_latest_label")]
    pub latest_label: String,

    /// Branches must match this pattern to be listed.
    #[serde(default = "default_include")]
    pub include: String,

    /// Branches matching any of these patterns are hidden.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Link for a version, with `{version}` and `{slug}` placeholders.
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Link for the latest docs, with a `{slug}` placeholder.
    #[serde(default = "default_latest_url_template")]
    pub latest_url_template: String,

    /// Maximum number of versions listed besides the latest.
    #[serde(default)]
    pub max_versions: Option<usize>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_latest_label() -> String {
    "latest".to_string()
}

fn default_include() -> String {
    r"^v?\d+(\.\d+)*$".to_string()
}

fn default_url_template() -> String {
    "/{version}/{slug}".to_string()
}

fn default_latest_url_template() -> String {
    "/{slug}".to_string()
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            latest_label: default_latest_label(),
            include: default_include(),
            exclude: Vec::new(),
            url_template: default_url_template(),
            latest_url_template: default_latest_url_template(),
            max_versions: None,
        }
    }
}

impl VersionConfig {
    /// Link to `slug` in the docs of `entry`.
    pub fn url_for(&self, entry: &VersionEntry, slug: &str) -> String {
        let slug = slug.trim_start_matches('/');
        let template = if entry.is_latest {
            &self.latest_url_template
        } else {
            &self.url_template
        };
        template
            .replace("{version}", &entry.name)
            .replace("{slug}", slug)
    }
}

/// One entry of the version dropdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionEntry {
    /// Branch name, also the URL segment.
    pub name: String,

    /// Text shown in the dropdown.
    pub label: String,

    /// Whether this is the default branch.
    #[serde(default)]
    pub is_latest: bool,
}

impl VersionEntry {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            is_latest: false,
        }
    }

    fn latest(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            is_latest: true,
        }
    }
}

/// Compiled branch filter.
#[derive(Debug, Clone)]
pub struct VersionFilter {
    config: VersionConfig,
    include: Regex,
    exclude: Vec<Regex>,
}

impl VersionFilter {
    /// Compile the patterns of `config`.
    pub fn new(config: &VersionConfig) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| CoreError::pattern(pattern, e))
        };

        Ok(Self {
            include: compile(config.include.as_str())?,
            exclude: config
                .exclude
                .iter()
                .map(|pattern| compile(pattern.as_str()))
                .collect::<Result<_>>()?,
            config: config.clone(),
        })
    }

    fn keeps(&self, branch: &str) -> bool {
        self.include.is_match(branch) && !self.exclude.iter().any(|re| re.is_match(branch))
    }

    /// Dropdown entries for `branches`: the default branch first, then
    /// matching versions newest first.
    pub fn filter<S: AsRef<str>>(&self, branches: &[S]) -> Vec<VersionEntry> {
        let mut seen = HashSet::new();
        let mut has_default = false;
        let mut versions: Vec<&str> = Vec::new();

        for branch in branches.iter().map(|b| b.as_ref().trim()) {
            if branch.is_empty() || !seen.insert(branch) {
                continue;
            }
            if branch == self.config.default_branch {
                has_default = true;
            } else if self.keeps(branch) {
                versions.push(branch);
            }
        }

        versions.sort_by(|a, b| compare_versions(b, a));
        if let Some(max) = self.config.max_versions {
            versions.truncate(max);
        }

        let mut entries = Vec::with_capacity(versions.len() + 1);
        if has_default {
            entries.push(VersionEntry::latest(
                &self.config.default_branch,
                &self.config.latest_label,
            ));
        }
        entries.extend(versions.into_iter().map(VersionEntry::new));

        tracing::debug!(
            branches = branches.len(),
            listed = entries.len(),
            "filtered version branches"
        );
        entries
    }
}

/// Filter `branches` into dropdown entries using `config`.
pub fn filter_versions<S: AsRef<str>>(
    branches: &[S],
    config: &VersionConfig,
) -> Result<Vec<VersionEntry>> {
    Ok(VersionFilter::new(config)?.filter(branches))
}

/// Numeric components of a version name: `v1.10.2` is `[1, 10, 2]`.
fn version_key(name: &str) -> Vec<u64> {
    name.split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Natural ordering of version names, falling back to the name itself.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    version_key(a).cmp(&version_key(b)).then_with(|| a.cmp(b))
}

/// Entry whose name is the first segment of `path`, or the latest entry.
pub fn current_version<'a>(path: &str, entries: &'a [VersionEntry]) -> Option<&'a VersionEntry> {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or_default();
    entries
        .iter()
        .find(|entry| !entry.is_latest && entry.name == first)
        .or_else(|| entries.iter().find(|entry| entry.is_latest))
}

/// `path` without its leading version segment.
pub fn strip_version<'a>(path: &'a str, entries: &[VersionEntry]) -> &'a str {
    let trimmed = path.trim_start_matches('/');
    let (first, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));
    if entries.iter().any(|entry| !entry.is_latest && entry.name == first) {
        rest
    } else {
        trimmed
    }
}
