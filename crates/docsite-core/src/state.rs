//! Headless table-of-contents renderer.
//!
//! [`TocState`] owns the per-node open/hover flags for one rendered tree,
//! keyed by [`NodePath`]. Rendering mounts nodes lazily: a node gets state the
//! first time it becomes visible and loses it as soon as it is hidden again, so
//! a reopened subtree starts from its active state.
//!
//! Open state follows the active section only on navigation. Re-rendering, or
//! reporting the section that is already active, leaves user toggles alone.

use std::collections::{HashMap, HashSet};

use crate::toc::{NodePath, TocNode, TocTitle, find_node};

/// Ephemeral render state of one mounted node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    /// Children are shown.
    pub open: bool,
    /// Pointer is over the advisory icon.
    pub hovered: bool,
}

impl NodeState {
    /// State of a freshly mounted node.
    pub fn initial(is_active: bool) -> Self {
        Self {
            open: is_active,
            hovered: false,
        }
    }

    /// Reset the open flag after navigation.
    pub fn resync(&mut self, is_active: bool) {
        self.open = is_active;
    }

    /// Apply a click on `node` to this state.
    ///
    /// Drawers flip `open` and never navigate. Links leave the state alone,
    /// call `on_click` once and request navigation to their target.
    pub fn click(&mut self, node: &TocNode, on_click: impl FnOnce()) -> ClickOutcome {
        if node.is_drawer() {
            self.open = !self.open;
            return ClickOutcome::Toggled { open: self.open };
        }

        match node.target() {
            Some(target) => {
                on_click();
                ClickOutcome::Navigate {
                    target: target.to_string(),
                }
            }
            None => ClickOutcome::Ignored,
        }
    }

    /// Open state after the active section changed from `previous` to `current`.
    ///
    /// Keeps `open` unless the section value really changed.
    pub fn on_section_change(open: bool, previous: &str, current: &str, is_active: bool) -> bool {
        if previous == current { open } else { is_active }
    }
}

/// How a visible row reacts to a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Toggles its children.
    Drawer,
    /// Navigates to `target`.
    Link { target: String, external: bool },
}

/// One visible entry of the rendered tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TocRow {
    pub path: NodePath,
    /// Depth, 1 for top-level nodes.
    pub level: usize,
    pub title: TocTitle,
    pub kind: RowKind,
    pub is_active: bool,
    pub is_selected: bool,
    pub open: bool,
    pub hovered: bool,
    pub show_icon: bool,
    pub has_children: bool,
}

/// Result of clicking a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A drawer flipped to the given open state.
    Toggled { open: bool },
    /// Navigation to `target` was requested.
    Navigate { target: String },
    /// The path does not name a clickable node.
    Ignored,
}

/// Per-node state of one table of contents.
#[derive(Debug, Clone, Default)]
pub struct TocState {
    active_section: String,
    nodes: HashMap<NodePath, NodeState>,
}

impl TocState {
    pub fn new(active_section: impl Into<String>) -> Self {
        Self {
            active_section: active_section.into(),
            nodes: HashMap::new(),
        }
    }

    pub fn active_section(&self) -> &str {
        &self.active_section
    }

    /// State of a mounted node.
    pub fn node_state(&self, path: &NodePath) -> Option<NodeState> {
        self.nodes.get(path).copied()
    }

    pub fn is_mounted(&self, path: &NodePath) -> bool {
        self.nodes.contains_key(path)
    }

    /// Render `nodes` as top-level entries.
    pub fn render(&mut self, nodes: &[TocNode]) -> Vec<TocRow> {
        self.render_at(nodes, 1)
    }

    /// Render `nodes` starting at `level`.
    ///
    /// Mounts newly visible nodes and drops the state of every node that is
    /// no longer visible.
    pub fn render_at(&mut self, nodes: &[TocNode], level: usize) -> Vec<TocRow> {
        let mut rows = Vec::new();
        let mut rendered = HashSet::new();
        self.render_level(nodes, &NodePath::root(), level, &mut rows, &mut rendered);

        let before = self.nodes.len();
        self.nodes.retain(|path, _| rendered.contains(path));
        if self.nodes.len() != before {
            tracing::trace!(unmounted = before - self.nodes.len(), "dropped hidden node state");
        }
        rows
    }

    fn render_level(
        &mut self,
        nodes: &[TocNode],
        parent: &NodePath,
        level: usize,
        rows: &mut Vec<TocRow>,
        rendered: &mut HashSet<NodePath>,
    ) {
        for node in nodes {
            let path = parent.child(node.key());
            let is_active = node.is_active(&self.active_section);
            let state = *self
                .nodes
                .entry(path.clone())
                .or_insert_with(|| NodeState::initial(is_active));

            let kind = if node.is_drawer() {
                RowKind::Drawer
            } else {
                RowKind::Link {
                    target: node.target().unwrap_or_default().to_string(),
                    external: node.is_external(),
                }
            };

            rows.push(TocRow {
                path: path.clone(),
                level,
                title: node.title.clone(),
                kind,
                is_active,
                is_selected: node.is_selected(&self.active_section),
                open: state.open,
                hovered: state.hovered,
                show_icon: node.options.tocicon,
                has_children: !node.children.is_empty(),
            });
            rendered.insert(path.clone());

            if state.open {
                self.render_level(&node.children, &path, level + 1, rows, rendered);
            }
        }
    }

    /// Handle a click on the node at `path`.
    ///
    /// Drawers toggle and never navigate. Links call `on_click` once and
    /// request navigation to their target.
    pub fn click(
        &mut self,
        nodes: &[TocNode],
        path: &NodePath,
        on_click: impl FnOnce(),
    ) -> ClickOutcome {
        let Some(node) = find_node(nodes, path) else {
            return ClickOutcome::Ignored;
        };

        let mut detached = NodeState::initial(node.is_active(&self.active_section));
        let state = if node.is_drawer() {
            self.nodes.entry(path.clone()).or_insert(detached)
        } else {
            &mut detached
        };

        let outcome = state.click(node, on_click);
        tracing::trace!(path = %path, ?outcome, "toc click");
        outcome
    }

    /// Set the hover flag of a mounted icon node.
    ///
    /// Returns `false` when the node is not mounted or has no icon.
    pub fn set_hovered(&mut self, nodes: &[TocNode], path: &NodePath, hovered: bool) -> bool {
        let has_icon = find_node(nodes, path).is_some_and(|node| node.options.tocicon);
        match self.nodes.get_mut(path) {
            Some(state) if has_icon => {
                state.hovered = hovered;
                true
            }
            _ => false,
        }
    }

    /// Report the current active section.
    ///
    /// When it differs from the previous one, every mounted node resets its
    /// open flag to whether it is now active. Returns whether a resync ran.
    pub fn set_active_section(&mut self, nodes: &[TocNode], section: &str) -> bool {
        if self.active_section == section {
            return false;
        }

        tracing::debug!(
            from = %self.active_section,
            to = %section,
            mounted = self.nodes.len(),
            "active section changed, resyncing open state"
        );
        self.active_section = section.to_string();
        for (path, state) in &mut self.nodes {
            let is_active = find_node(nodes, path).is_some_and(|node| node.is_active(section));
            state.resync(is_active);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn path(keys: &[&str]) -> NodePath {
        NodePath::from_keys(keys.iter().copied())
    }

    fn tree() -> Vec<TocNode> {
        vec![
            TocNode::page("Guide", "guide").with_children(vec![
                TocNode::page("Install", "guide/install"),
                TocNode::page("Usage", "guide/usage")
                    .with_children(vec![TocNode::page("Advanced", "guide/usage/advanced")]),
            ]),
            TocNode::page("Reference", "reference")
                .as_drawer()
                .with_children(vec![TocNode::page("CLI", "reference/cli")]),
            TocNode::external("Source", "https://github.com/docsite/docsite").with_icon(),
        ]
    }

    fn targets(rows: &[TocRow]) -> Vec<String> {
        rows.iter().map(|row| row.path.keys().last().cloned().unwrap_or_default()).collect()
    }

    #[test]
    fn test_two_level_example() {
        let nodes = vec![TocNode::page("A", "a").with_children(vec![TocNode::page("B", "a/b")])];
        let mut state = TocState::new("a/b");
        let rows = state.render(&nodes);

        assert_eq!(rows.len(), 2);
        let root = &rows[0];
        assert!(root.is_active);
        assert!(!root.is_selected);
        assert!(root.open);
        assert_eq!(root.level, 1);

        let child = &rows[1];
        assert!(child.is_active);
        assert!(child.is_selected);
        assert_eq!(child.level, 2);
    }

    #[test]
    fn test_inactive_nodes_start_closed() {
        let nodes = tree();
        let mut state = TocState::new("elsewhere");
        let rows = state.render(&nodes);

        assert_eq!(targets(&rows), vec!["guide", "reference", "https://github.com/docsite/docsite"]);
        assert!(rows.iter().all(|row| !row.open && !row.is_active));
    }

    #[test]
    fn test_drawer_click_toggles_without_navigation() {
        let nodes = tree();
        let mut state = TocState::new("elsewhere");
        state.render(&nodes);

        let calls = Cell::new(0);
        let drawer = path(&["reference"]);
        assert_eq!(state.node_state(&drawer), Some(NodeState::initial(false)));

        let first = state.click(&nodes, &drawer, || calls.set(calls.get() + 1));
        assert_eq!(first, ClickOutcome::Toggled { open: true });
        let rows = state.render(&nodes);
        assert!(targets(&rows).contains(&"reference/cli".to_string()));

        let second = state.click(&nodes, &drawer, || calls.set(calls.get() + 1));
        assert_eq!(second, ClickOutcome::Toggled { open: false });
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_active_drawer_still_never_navigates() {
        let nodes = tree();
        let mut state = TocState::new("reference/cli");
        state.render(&nodes);

        let drawer = path(&["reference"]);
        assert!(state.node_state(&drawer).is_some_and(|s| s.open));
        let outcome = state.click(&nodes, &drawer, || panic!("drawer must not call on_click"));
        assert_eq!(outcome, ClickOutcome::Toggled { open: false });
    }

    #[test]
    fn test_link_click_navigates_once() {
        let nodes = tree();
        let mut state = TocState::new("");
        state.render(&nodes);

        let calls = Cell::new(0);
        let outcome = state.click(&nodes, &path(&["guide"]), || calls.set(calls.get() + 1));
        assert_eq!(
            outcome,
            ClickOutcome::Navigate {
                target: "guide".to_string()
            }
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_unknown_path_is_ignored() {
        let nodes = tree();
        let mut state = TocState::new("");
        let outcome = state.click(&nodes, &path(&["missing"]), || panic!("not clickable"));
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[test]
    fn test_navigation_reopens_closed_ancestor_chain() {
        let nodes = tree();
        let mut state = TocState::new("reference/cli");
        let rows = state.render(&nodes);
        assert!(!rows[0].open);

        assert!(state.set_active_section(&nodes, "guide/usage/advanced"));
        let rows = state.render(&nodes);

        assert_eq!(
            targets(&rows),
            vec![
                "guide",
                "guide/install",
                "guide/usage",
                "guide/usage/advanced",
                "reference",
                "https://github.com/docsite/docsite",
            ]
        );
        assert!(rows[0].open);
        assert!(rows[2].open);
        assert!(rows[3].is_selected);
        // the drawer holding the old section closed on navigation
        assert!(!rows[4].open);
    }

    #[test]
    fn test_same_section_does_not_resync() {
        let nodes = tree();
        let mut state = TocState::new("reference/cli");
        state.render(&nodes);

        let drawer = path(&["reference"]);
        state.click(&nodes, &drawer, || {});
        assert!(state.node_state(&drawer).is_some_and(|s| !s.open));

        // re-render and a repeated report of the same section keep the toggle
        state.render(&nodes);
        assert!(!state.set_active_section(&nodes, "reference/cli"));
        state.render(&nodes);
        assert!(state.node_state(&drawer).is_some_and(|s| !s.open));
    }

    #[test]
    fn test_navigation_resyncs_user_opened_drawer() {
        let nodes = tree();
        let mut state = TocState::new("guide");
        state.render(&nodes);

        let drawer = path(&["reference"]);
        state.click(&nodes, &drawer, || {});
        assert!(state.node_state(&drawer).is_some_and(|s| s.open));

        assert!(state.set_active_section(&nodes, "guide/install"));
        assert!(state.node_state(&drawer).is_some_and(|s| !s.open));
    }

    #[test]
    fn test_closing_discards_child_state() {
        let nodes = tree();
        let mut state = TocState::new("guide/usage/advanced");
        state.render(&nodes);

        let usage = path(&["guide", "guide/usage"]);
        assert!(state.is_mounted(&usage));

        state.set_active_section(&nodes, "reference/cli");
        state.render(&nodes);
        assert!(!state.is_mounted(&usage));

        // reopening mounts the children again from their active state
        state.set_active_section(&nodes, "guide/install");
        let rows = state.render(&nodes);
        assert!(state.is_mounted(&usage));
        assert!(!rows.iter().find(|row| row.path == usage).is_some_and(|row| row.open));
    }

    #[test]
    fn test_hover_only_on_icon_nodes() {
        let nodes = tree();
        let mut state = TocState::new("");
        state.render(&nodes);

        let icon = path(&["https://github.com/docsite/docsite"]);
        assert!(state.set_hovered(&nodes, &icon, true));
        let rows = state.render(&nodes);
        let row = rows.iter().find(|row| row.path == icon).expect("icon row");
        assert!(row.show_icon);
        assert!(row.hovered);

        assert!(!state.set_hovered(&nodes, &path(&["guide"]), true));
        assert!(!state.set_hovered(&nodes, &path(&["guide", "guide/install"]), true));
    }

    #[test]
    fn test_render_at_custom_level() {
        let nodes = vec![TocNode::page("A", "a").with_children(vec![TocNode::page("B", "a/b")])];
        let mut state = TocState::new("a/b");
        let rows = state.render_at(&nodes, 3);
        assert_eq!(rows[0].level, 3);
        assert_eq!(rows[1].level, 4);
    }

    #[test]
    fn test_row_kinds() {
        let nodes = tree();
        let mut state = TocState::new("");
        let rows = state.render(&nodes);

        assert_eq!(
            rows[0].kind,
            RowKind::Link {
                target: "guide".to_string(),
                external: false
            }
        );
        assert_eq!(rows[1].kind, RowKind::Drawer);
        assert!(matches!(rows[2].kind, RowKind::Link { external: true, .. }));
    }

    #[test]
    fn test_node_state_click() {
        let drawer = TocNode::page("R", "r")
            .as_drawer()
            .with_children(vec![TocNode::page("C", "r/c")]);
        let link = TocNode::page("A", "a");
        let mut orphan = TocNode::page("X", "x");
        orphan.slug = None;

        let calls = Cell::new(0);
        let mut state = NodeState::initial(true);
        assert_eq!(
            state.click(&drawer, || calls.set(calls.get() + 1)),
            ClickOutcome::Toggled { open: false }
        );
        assert_eq!(
            state.click(&drawer, || calls.set(calls.get() + 1)),
            ClickOutcome::Toggled { open: true }
        );
        assert_eq!(calls.get(), 0);

        let before = state;
        assert_eq!(
            state.click(&link, || calls.set(calls.get() + 1)),
            ClickOutcome::Navigate {
                target: "a".to_string()
            }
        );
        assert_eq!(state, before);
        assert_eq!(calls.get(), 1);

        assert_eq!(state.click(&orphan, || calls.set(calls.get() + 1)), ClickOutcome::Ignored);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_on_section_change() {
        assert!(NodeState::on_section_change(true, "a", "a", false));
        assert!(!NodeState::on_section_change(false, "a", "a", true));
        assert!(NodeState::on_section_change(false, "a", "b", true));
        assert!(!NodeState::on_section_change(true, "a", "b", false));
    }
}
