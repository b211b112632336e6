//! Navigation tree model and the active/selected predicates.
//!
//! A [`NavTree`] is immutable input supplied by the site structure. Each
//! [`TocNode`] links to an internal slug or an external URL, or acts as a
//! drawer that only expands its children.

use std::{collections::HashSet, fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Title of a navigation entry.
///
/// Either plain text, or a sequence of formatted segments for mixed
/// styling such as inline code spans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TocTitle {
    Plain(String),
    Segments(Vec<TitleSegment>),
}

impl TocTitle {
    /// Title with all formatting removed.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Plain(text) => text.clone(),
            Self::Segments(segments) => segments_text(segments),
        }
    }
}

impl From<&str> for TocTitle {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<String> for TocTitle {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

impl From<Vec<TitleSegment>> for TocTitle {
    fn from(value: Vec<TitleSegment>) -> Self {
        Self::Segments(value)
    }
}

/// One formatted piece of a structured title.
///
/// Container segments nest, so `Strong` may hold `Code` and so on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TitleSegment {
    Text { value: String },
    Code { value: String },
    Emphasis { children: Vec<TitleSegment> },
    Strong { children: Vec<TitleSegment> },
    Link { href: String, children: Vec<TitleSegment> },
}

impl TitleSegment {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn code(value: impl Into<String>) -> Self {
        Self::Code {
            value: value.into(),
        }
    }

    pub fn emphasis(children: Vec<TitleSegment>) -> Self {
        Self::Emphasis { children }
    }

    pub fn strong(children: Vec<TitleSegment>) -> Self {
        Self::Strong { children }
    }

    /// Text content of this segment and everything below it.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text { value } | Self::Code { value } => value.clone(),
            Self::Emphasis { children } | Self::Strong { children } | Self::Link { children, .. } => {
                segments_text(children)
            }
        }
    }
}

fn segments_text(segments: &[TitleSegment]) -> String {
    segments.iter().map(TitleSegment::plain_text).collect()
}

/// Display flags of a navigation entry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TocOptions {
    /// Clicking toggles the children instead of navigating.
    #[serde(default)]
    pub drawer: bool,

    /// Show the advisory icon with a hover tooltip.
    #[serde(default)]
    pub tocicon: bool,
}

/// A node of the navigation tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TocNode {
    /// Display title.
    pub title: TocTitle,

    /// Internal navigation path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// External link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Child nodes in render order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocNode>,

    /// Display flags.
    #[serde(default)]
    pub options: TocOptions,
}

impl TocNode {
    /// Create a node linking to an internal slug.
    pub fn page(title: impl Into<TocTitle>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: Some(slug.into()),
            url: None,
            children: Vec::new(),
            options: TocOptions::default(),
        }
    }

    /// Create a node linking to an external URL.
    pub fn external(title: impl Into<TocTitle>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: None,
            url: Some(url.into()),
            children: Vec::new(),
            options: TocOptions::default(),
        }
    }

    /// Add child nodes.
    pub fn with_children(mut self, children: Vec<TocNode>) -> Self {
        self.children = children;
        self
    }

    /// Mark this node as a drawer.
    pub fn as_drawer(mut self) -> Self {
        self.options.drawer = true;
        self
    }

    /// Show the advisory icon on this node.
    pub fn with_icon(mut self) -> Self {
        self.options.tocicon = true;
        self
    }

    /// Navigation target: the slug when present, otherwise the URL.
    pub fn target(&self) -> Option<&str> {
        self.slug.as_deref().or(self.url.as_deref())
    }

    /// Whether the target leaves the site.
    pub fn is_external(&self) -> bool {
        self.slug.is_none() && self.url.is_some()
    }

    /// Sibling-unique rendering key.
    ///
    /// Target-less drawers fall back to their title text.
    pub fn key(&self) -> String {
        match self.target() {
            Some(target) => target.to_string(),
            None => self.title.plain_text(),
        }
    }

    /// Whether clicking this node toggles children instead of navigating.
    pub fn is_drawer(&self) -> bool {
        self.options.drawer && !self.children.is_empty()
    }

    /// Whether this node or any descendant is the active section.
    pub fn is_active(&self, active_section: &str) -> bool {
        is_active(active_section, self.target(), &self.children)
    }

    /// Whether this node itself is the active section.
    pub fn is_selected(&self, active_section: &str) -> bool {
        is_selected(active_section, self.target())
    }
}

/// Whether `target` or any node in `children`, at any depth, is `active_section`.
///
/// Trees must be acyclic.
pub fn is_active(active_section: &str, target: Option<&str>, children: &[TocNode]) -> bool {
    is_selected(active_section, target)
        || children
            .iter()
            .any(|child| is_active(active_section, child.target(), &child.children))
}

/// Whether `target` is exactly `active_section`.
pub fn is_selected(active_section: &str, target: Option<&str>) -> bool {
    target == Some(active_section)
}

/// Identity of a node: the keys of every node from the root down to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<String>);

impl NodePath {
    /// The empty path, parent of the top-level nodes.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Path of the child with `key`.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.into());
        Self(keys)
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Number of keys, equal to the node's level.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &NodePath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" > "))
    }
}

/// The navigation tree of a site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct NavTree {
    pub nodes: Vec<TocNode>,
}

impl NavTree {
    pub fn new(nodes: Vec<TocNode>) -> Self {
        Self { nodes }
    }

    /// Parse a tree from JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse a tree from YAML.
    pub fn from_yaml(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Load a tree from a `.json`, `.yaml` or `.yml` file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let tree = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content)?,
            Some("yaml" | "yml") => Self::from_yaml(&content)?,
            _ => {
                return Err(CoreError::parse(
                    path,
                    "unsupported navigation format, expected json or yaml",
                ));
            }
        };

        tree.validate()?;
        tracing::debug!(path = %path.display(), nodes = tree.len(), "loaded navigation tree");
        Ok(tree)
    }

    /// Check sibling keys are unique and every non-drawer node has a target.
    pub fn validate(&self) -> Result<()> {
        validate_siblings(&self.nodes, &NodePath::root())
    }

    /// Total number of nodes at every depth.
    pub fn len(&self) -> usize {
        fn count(nodes: &[TocNode]) -> usize {
            nodes.iter().map(|node| 1 + count(&node.children)).sum()
        }
        count(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up the node at `path`.
    pub fn get(&self, path: &NodePath) -> Option<&TocNode> {
        find_node(&self.nodes, path)
    }

    /// Paths from the top level down to the node selected by `active_section`.
    ///
    /// Empty when no node matches.
    pub fn active_chain(&self, active_section: &str) -> Vec<NodePath> {
        let mut chain = Vec::new();
        collect_chain(&self.nodes, &NodePath::root(), active_section, &mut chain);
        chain
    }
}

/// Look up the node at `path` below `nodes`.
pub fn find_node<'a>(nodes: &'a [TocNode], path: &NodePath) -> Option<&'a TocNode> {
    let (first, rest) = path.keys().split_first()?;
    let mut node = nodes.iter().find(|node| &node.key() == first)?;
    for key in rest {
        node = node.children.iter().find(|child| &child.key() == key)?;
    }
    Some(node)
}

fn collect_chain(
    nodes: &[TocNode],
    parent: &NodePath,
    active_section: &str,
    chain: &mut Vec<NodePath>,
) -> bool {
    for node in nodes {
        if !node.is_active(active_section) {
            continue;
        }
        let path = parent.child(node.key());
        chain.push(path.clone());
        if node.is_selected(active_section)
            || collect_chain(&node.children, &path, active_section, chain)
        {
            return true;
        }
        chain.pop();
    }
    false
}

fn validate_siblings(nodes: &[TocNode], parent: &NodePath) -> Result<()> {
    let mut seen = HashSet::new();
    for node in nodes {
        let key = node.key();
        let path = parent.child(key.clone());

        if !node.is_drawer() && node.target().is_none() {
            return Err(CoreError::navigation(
                path.to_string(),
                "link node has neither slug nor url",
            ));
        }
        if !seen.insert(key) {
            return Err(CoreError::navigation(
                path.to_string(),
                "duplicate key among siblings",
            ));
        }

        validate_siblings(&node.children, &path)?;
    }
    Ok(())
}
