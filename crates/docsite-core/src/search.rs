//! Search hits as shown in the result list.

use serde::{Deserialize, Serialize};

use crate::{
    config::SearchConfig,
    error::Result,
    markup::{highlight, preview},
    toc::{NavTree, TocNode},
};

/// A single search hit from the site index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Page title, may contain markup.
    pub title: String,

    /// Internal path of the page.
    pub slug: String,

    /// Text around the match, may contain markup.
    #[serde(default)]
    pub preview: Option<String>,

    /// Section titles leading to the page.
    #[serde(default)]
    pub breadcrumbs: Vec<String>,

    /// Relevance score.
    #[serde(default)]
    pub score: f32,
}

/// A hit ready to be inserted as HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHit {
    pub slug: String,
    /// Sanitized title with highlighted matches.
    pub title_html: String,
    /// Sanitized preview snippet with highlighted matches.
    pub preview_html: Option<String>,
    /// Breadcrumbs joined for display.
    pub breadcrumbs: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            preview: None,
            breadcrumbs: Vec::new(),
            score: 0.0,
        }
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn with_breadcrumbs(mut self, breadcrumbs: Vec<String>) -> Self {
        self.breadcrumbs = breadcrumbs;
        self
    }

    /// Sanitize and highlight this hit for `query`.
    pub fn render(&self, query: &str, config: &SearchConfig) -> Result<RenderedHit> {
        let preview_html = match &self.preview {
            Some(raw) => {
                let window = preview(raw, query, config.snippet_radius, &config.sanitize)?;
                Some(highlight(&window, query, &config.sanitize)?)
            }
            None => None,
        };

        Ok(RenderedHit {
            slug: self.slug.clone(),
            title_html: highlight(&self.title, query, &config.sanitize)?,
            preview_html,
            breadcrumbs: self.breadcrumbs.join(" › "),
        })
    }
}

/// Order hits by descending score, keeping at most `limit`.
pub fn rank(mut hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(limit);
    hits
}

/// Title search over the navigation tree.
///
/// Every query term must occur in the title of a page. Terms matching at the
/// start of a word score higher. Drawers without a slug never match.
pub fn search_tree(tree: &NavTree, query: &str) -> Vec<SearchHit> {
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    let mut hits = Vec::new();
    if !terms.is_empty() {
        collect_hits(&tree.nodes, &terms, &mut Vec::new(), &mut hits);
    }
    hits
}

fn collect_hits(
    nodes: &[TocNode],
    terms: &[String],
    trail: &mut Vec<String>,
    hits: &mut Vec<SearchHit>,
) {
    for node in nodes {
        let title = node.title.plain_text();
        if let (Some(slug), Some(score)) = (&node.slug, score_title(&title, terms)) {
            let mut hit = SearchHit::new(title.clone(), slug.clone())
                .with_breadcrumbs(trail.clone());
            hit.score = score;
            hits.push(hit);
        }

        trail.push(title);
        collect_hits(&node.children, terms, trail, hits);
        trail.pop();
    }
}

fn score_title(title: &str, terms: &[String]) -> Option<f32> {
    let lower = title.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();

    let mut score = 0.0;
    for term in terms {
        if !lower.contains(term.as_str()) {
            return None;
        }
        score += if words.iter().any(|word| word.starts_with(term.as_str())) {
            2.0
        } else {
            1.0
        };
    }
    Some(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_highlights_and_sanitizes() {
        let hit = SearchHit::new("Install <script>x</script>the CLI", "guide/install")
            .with_preview("Run <b>cargo</b> install to get the CLI")
            .with_breadcrumbs(vec!["Guide".to_string(), "Install".to_string()]);

        let rendered = hit.render("cli", &SearchConfig::default()).unwrap();
        assert_eq!(rendered.title_html, "Install the <mark>CLI</mark>");
        assert_eq!(
            rendered.preview_html.as_deref(),
            Some("Run <b>cargo</b> install to get the <mark>CLI</mark>")
        );
        assert_eq!(rendered.breadcrumbs, "Guide › Install");
        assert_eq!(rendered.slug, "guide/install");
    }

    #[test]
    fn test_render_preview_skips_hidden_markup() {
        let config = SearchConfig {
            snippet_radius: 6,
            ..SearchConfig::default()
        };
        let hit = SearchHit::new("CLI", "cli")
            .with_preview("<script>var cli = steal()</script> Install the cli tool");
        let rendered = hit.render("cli", &config).unwrap();
        assert_eq!(
            rendered.preview_html.as_deref(),
            Some("…ll the <mark>cli</mark> tool")
        );

        let hit = SearchHit::new("Intro", "intro")
            .with_preview(r#"<span title="the config">Intro</span> text about config files"#);
        let rendered = hit.render("config", &SearchConfig::default()).unwrap();
        assert_eq!(
            rendered.preview_html.as_deref(),
            Some("<span>Intro</span> text about <mark>config</mark> files")
        );
    }

    #[test]
    fn test_render_without_preview() {
        let hit = SearchHit::new("API", "api");
        let rendered = hit.render("", &SearchConfig::default()).unwrap();
        assert_eq!(rendered.title_html, "API");
        assert!(rendered.preview_html.is_none());
    }

    #[test]
    fn test_rank() {
        let mut a = SearchHit::new("A", "a");
        a.score = 1.0;
        let mut b = SearchHit::new("B", "b");
        b.score = 3.0;
        let mut c = SearchHit::new("C", "c");
        c.score = 2.0;

        let ranked = rank(vec![a, b, c], 2);
        let slugs: Vec<&str> = ranked.iter().map(|hit| hit.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "c"]);
    }

    #[test]
    fn test_search_tree() {
        let tree = NavTree::new(vec![
            TocNode::page("Guide", "guide").with_children(vec![
                TocNode::page("Install the CLI", "guide/install"),
                TocNode::page("Publishing", "guide/publish"),
            ]),
            TocNode::page("CLI reference", "reference/cli"),
        ]);

        let hits = search_tree(&tree, "cli");
        let slugs: Vec<&str> = hits.iter().map(|hit| hit.slug.as_str()).collect();
        assert_eq!(slugs, vec!["guide/install", "reference/cli"]);
        assert_eq!(hits[0].breadcrumbs, vec!["Guide"]);
        assert!(hits[1].breadcrumbs.is_empty());

        let hits = search_tree(&tree, "lish");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 1.0);

        assert!(search_tree(&tree, "cli missing").is_empty());
        assert!(search_tree(&tree, "  ").is_empty());
    }

    #[test]
    fn test_hit_deserialization() {
        let json = r#"{"title": "Config", "slug": "reference/config", "score": 2.5}"#;
        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.slug, "reference/config");
        assert!(hit.preview.is_none());
        assert!(hit.breadcrumbs.is_empty());
    }
}
