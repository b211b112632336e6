//! Allow-list sanitizing and query highlighting for preview markup.
//!
//! Search previews come from an external index and may contain arbitrary
//! markup. Everything rendered as HTML goes through [`sanitize`] first.

use std::{collections::HashSet, ops::Range, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9-]*)([^<>]*)>").unwrap()
});

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

static SAFE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\- ]+$").unwrap());

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").unwrap());

static ENTITY_AT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").unwrap());

/// Elements removed together with their content.
const DROP_CONTENT: &[&str] = &["script", "style", "iframe", "object", "template", "noscript"];

/// Allowed elements that never have a closing tag.
const VOID_TAGS: &[&str] = &["br"];

/// Which markup survives sanitizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SanitizePolicy {
    /// Tag names kept, lowercase.
    #[serde(default = "default_allowed_tags")]
    pub allowed_tags: Vec<String>,

    /// Keep `class` attributes with plain class names on allowed tags.
    #[serde(default)]
    pub allow_class: bool,
}

fn default_allowed_tags() -> Vec<String> {
    ["b", "strong", "em", "i", "code", "mark", "br", "span", "sub", "sup"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            allowed_tags: default_allowed_tags(),
            allow_class: false,
        }
    }
}

impl SanitizePolicy {
    /// Whether `tag` may appear in sanitized output.
    pub fn allows(&self, tag: &str) -> bool {
        self.allowed_tags.iter().any(|allowed| allowed.eq_ignore_ascii_case(tag))
    }
}

/// Strip everything but the allowed tags from `html`.
///
/// Disallowed tags are removed while their text is kept, except for
/// script-like elements which lose their content too. Attributes are dropped
/// apart from plain `class` values when the policy allows them. Text is
/// escaped; existing character references are kept.
pub fn sanitize(html: &str, policy: &SanitizePolicy) -> String {
    let mut out = String::with_capacity(html.len());
    let mut skipping: Option<String> = None;
    let mut last = 0;

    for caps in TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        if skipping.is_none() {
            out.push_str(&escape_text(&html[last..whole.start()]));
        }
        last = whole.end();

        // comments
        let Some(name) = caps.get(2) else { continue };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|slash| !slash.as_str().is_empty());

        if let Some(skipped) = &skipping {
            if closing && *skipped == name {
                skipping = None;
            }
            continue;
        }

        if DROP_CONTENT.contains(&name.as_str()) {
            let self_closing = caps
                .get(3)
                .is_some_and(|attrs| attrs.as_str().trim_end().ends_with('/'));
            if !closing && !self_closing {
                skipping = Some(name);
            }
            continue;
        }

        if !policy.allows(&name) {
            continue;
        }

        if closing {
            out.push_str(&format!("</{name}>"));
            continue;
        }

        out.push('<');
        out.push_str(&name);
        if policy.allow_class {
            if let Some(class) = caps.get(3).and_then(|attrs| safe_class(attrs.as_str())) {
                out.push_str(&format!(" class=\"{class}\""));
            }
        }
        out.push('>');
    }

    if skipping.is_none() {
        out.push_str(&escape_text(&html[last..]));
    }
    out
}

fn safe_class(attrs: &str) -> Option<String> {
    let caps = CLASS_RE.captures(attrs)?;
    let value = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    SAFE_CLASS_RE.is_match(value).then(|| value.to_string())
}

/// Escape text for HTML, leaving character references intact.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, ch) in text.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '&' if !ENTITY_AT_RE.is_match(&text[i..]) => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Case-insensitive pattern matching any whitespace-separated query term.
///
/// Longer terms come first so they win over their own prefixes.
fn term_pattern(query: &str) -> Result<Option<Regex>> {
    let mut seen = HashSet::new();
    let mut terms: Vec<&str> = query
        .split_whitespace()
        .filter(|term| seen.insert(term.to_lowercase()))
        .collect();
    if terms.is_empty() {
        return Ok(None);
    }
    terms.sort_by_key(|term| std::cmp::Reverse(term.chars().count()));

    let alternation = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!("(?i)(?:{alternation})");
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| CoreError::pattern(pattern, e))
}

/// Sanitize `html` and wrap every match of a `query` term in `<mark>`.
///
/// Matching only touches text, never tag names or character references.
pub fn highlight(html: &str, query: &str, policy: &SanitizePolicy) -> Result<String> {
    let clean = sanitize(html, policy);
    let Some(pattern) = term_pattern(query)? else {
        return Ok(clean);
    };

    let mut out = String::with_capacity(clean.len() + 16);
    let mut last = 0;
    for tag in TAG_RE.find_iter(&clean) {
        mark_text(&clean[last..tag.start()], &pattern, &mut out);
        out.push_str(tag.as_str());
        last = tag.end();
    }
    mark_text(&clean[last..], &pattern, &mut out);
    Ok(out)
}

fn mark_text(text: &str, pattern: &Regex, out: &mut String) {
    let mut last = 0;
    for entity in ENTITY_RE.find_iter(text) {
        mark_run(&text[last..entity.start()], pattern, out);
        out.push_str(entity.as_str());
        last = entity.end();
    }
    mark_run(&text[last..], pattern, out);
}

fn mark_run(run: &str, pattern: &Regex, out: &mut String) {
    let mut last = 0;
    for found in pattern.find_iter(run) {
        out.push_str(&run[last..found.start()]);
        out.push_str("<mark>");
        out.push_str(found.as_str());
        out.push_str("</mark>");
        last = found.end();
    }
    out.push_str(&run[last..]);
}

/// Window of `radius` characters on each side of the first match, in chars.
///
/// Without a match the window covers the start of `text`.
fn window(text: &str, query: &str, radius: usize) -> Result<(usize, usize)> {
    let total = text.chars().count();
    let found = term_pattern(query)?.and_then(|pattern| pattern.find(text));
    Ok(match found {
        Some(m) => {
            let start = text[..m.start()].chars().count();
            let end = start + m.as_str().chars().count();
            (start.saturating_sub(radius), end.saturating_add(radius).min(total))
        }
        None => (0, radius.saturating_mul(2).min(total)),
    })
}

/// Cut a window of `radius` characters on each side of the first match.
///
/// Without a match the start of `text` is used. Truncated ends get an
/// ellipsis.
pub fn snippet(text: &str, query: &str, radius: usize) -> Result<String> {
    let (start, end) = window(text, query, radius)?;
    let body: String = text.chars().skip(start).take(end - start).collect();

    let mut out = String::new();
    if start > 0 {
        out.push('…');
    }
    out.push_str(body.trim());
    if end < text.chars().count() {
        out.push('…');
    }
    Ok(out)
}

/// Sanitized window of `html` around the first match of `query`.
///
/// The markup is sanitized before cutting and the window is measured in
/// visible characters, so it never starts inside a tag or a character
/// reference. Elements cut by the window are reopened or closed to keep the
/// fragment balanced.
pub fn preview(html: &str, query: &str, radius: usize, policy: &SanitizePolicy) -> Result<String> {
    let clean = sanitize(html, policy);
    let (plain, units) = text_units(&clean);
    if units.is_empty() {
        return Ok(String::new());
    }

    let (mut lo, mut hi) = window(&plain, query, radius)?;
    let (cut_start, cut_end) = (lo > 0, hi < units.len());
    let chars: Vec<char> = plain.chars().collect();
    while lo < hi && chars[lo].is_whitespace() {
        lo += 1;
    }
    while hi > lo && chars[hi - 1].is_whitespace() {
        hi -= 1;
    }

    let mut out = String::new();
    if cut_start {
        out.push('…');
    }
    if lo < hi {
        out.push_str(&balanced(&clean, units[lo].start, units[hi - 1].end));
    }
    if cut_end {
        out.push('…');
    }
    Ok(out)
}

/// Visible text of sanitized markup, one char per visible unit, with the
/// byte range each unit covers in `clean`.
fn text_units(clean: &str) -> (String, Vec<Range<usize>>) {
    let mut plain = String::new();
    let mut units = Vec::new();
    let mut last = 0;
    for tag in TAG_RE.find_iter(clean) {
        push_units(clean, last..tag.start(), &mut plain, &mut units);
        last = tag.end();
    }
    push_units(clean, last..clean.len(), &mut plain, &mut units);
    (plain, units)
}

fn push_units(clean: &str, run: Range<usize>, plain: &mut String, units: &mut Vec<Range<usize>>) {
    let mut i = run.start;
    while i < run.end {
        if let Some(entity) = ENTITY_AT_RE.find(&clean[i..run.end]) {
            plain.push(decode_entity(entity.as_str()));
            units.push(i..i + entity.end());
            i += entity.end();
        } else if let Some(ch) = clean[i..run.end].chars().next() {
            plain.push(ch);
            units.push(i..i + ch.len_utf8());
            i += ch.len_utf8();
        } else {
            break;
        }
    }
}

fn decode_entity(entity: &str) -> char {
    match entity {
        "&amp;" => '&',
        "&lt;" => '<',
        "&gt;" => '>',
        "&quot;" => '"',
        "&#39;" | "&apos;" => '\'',
        "&nbsp;" => ' ',
        _ => '\u{fffd}',
    }
}

/// `clean[start..end]` with the elements open at `start` reopened and the
/// elements still open at `end` closed.
fn balanced(clean: &str, start: usize, end: usize) -> String {
    let mut open: Vec<(String, String)> = Vec::new();
    track_tags(&clean[..start], &mut open);
    let mut out: String = open.iter().map(|(_, tag)| tag.as_str()).collect();

    let fragment = &clean[start..end];
    track_tags(fragment, &mut open);
    out.push_str(fragment);
    for (name, _) in open.iter().rev() {
        out.push_str(&format!("</{name}>"));
    }
    out
}

fn track_tags(markup: &str, open: &mut Vec<(String, String)>) {
    for caps in TAG_RE.captures_iter(markup) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let name = name.as_str();
        if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
            if let Some(pos) = open.iter().rposition(|(open_name, _)| open_name == name) {
                open.truncate(pos);
            }
        } else if !VOID_TAGS.contains(&name) {
            open.push((name.to_string(), whole.as_str().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_allowed_tags() {
        let policy = SanitizePolicy::default();
        let html = "Use <code>cargo</code> and <em>enjoy</em>";
        assert_eq!(sanitize(html, &policy), html);
    }

    #[test]
    fn test_sanitize_strips_disallowed_tags_keeps_text() {
        let policy = SanitizePolicy::default();
        let html = r#"<div class="x"><a href="javascript:alert(1)">click</a> me</div>"#;
        assert_eq!(sanitize(html, &policy), "click me");
    }

    #[test]
    fn test_sanitize_drops_script_content() {
        let policy = SanitizePolicy::default();
        let html = "before<script>alert('x')</script>after<style>p{}</style>";
        assert_eq!(sanitize(html, &policy), "beforeafter");
    }

    #[test]
    fn test_sanitize_drops_attributes() {
        let policy = SanitizePolicy::default();
        let html = r#"<em onclick="steal()" class="hl">x</em>"#;
        assert_eq!(sanitize(html, &policy), "<em>x</em>");
    }

    #[test]
    fn test_sanitize_keeps_safe_class_when_allowed() {
        let policy = SanitizePolicy {
            allow_class: true,
            ..SanitizePolicy::default()
        };
        assert_eq!(
            sanitize(r#"<span class="hl term">x</span>"#, &policy),
            r#"<span class="hl term">x</span>"#
        );
        assert_eq!(
            sanitize(r#"<span class="a&quot;b" onmouseover="x">x</span>"#, &policy),
            "<span>x</span>"
        );
    }

    #[test]
    fn test_sanitize_escapes_stray_markup() {
        let policy = SanitizePolicy::default();
        assert_eq!(sanitize("a < b > \"c\"", &policy), "a &lt; b &gt; &quot;c&quot;");
        assert_eq!(sanitize("<img src=x onerror=alert(1)>", &policy), "");
        assert_eq!(sanitize("<!-- hidden -->shown", &policy), "shown");
    }

    #[test]
    fn test_sanitize_preserves_entities() {
        let policy = SanitizePolicy::default();
        assert_eq!(sanitize("&amp; &#39; & more", &policy), "&amp; &#39; &amp; more");
    }

    #[test]
    fn test_highlight_terms_case_insensitive() {
        let policy = SanitizePolicy::default();
        let out = highlight("Install the CLI with cargo", "cli CARGO", &policy).unwrap();
        assert_eq!(out, "Install the <mark>CLI</mark> with <mark>cargo</mark>");
    }

    #[test]
    fn test_highlight_skips_tags_and_entities() {
        let policy = SanitizePolicy::default();
        let out = highlight("<code>amp</code> &amp; code", "code amp", &policy).unwrap();
        assert_eq!(
            out,
            "<code><mark>amp</mark></code> &amp; <mark>code</mark>"
        );
    }

    #[test]
    fn test_highlight_escapes_regex_metacharacters() {
        let policy = SanitizePolicy::default();
        let out = highlight("call foo() and foo.bar", "foo()", &policy).unwrap();
        assert_eq!(out, "call <mark>foo()</mark> and foo.bar");
    }

    #[test]
    fn test_highlight_prefers_longer_terms() {
        let policy = SanitizePolicy::default();
        let out = highlight("configuration", "config configuration", &policy).unwrap();
        assert_eq!(out, "<mark>configuration</mark>");
    }

    #[test]
    fn test_highlight_empty_query_only_sanitizes() {
        let policy = SanitizePolicy::default();
        let out = highlight("<b>bold</b><script>x</script>", "   ", &policy).unwrap();
        assert_eq!(out, "<b>bold</b>");
    }

    #[test]
    fn test_snippet_around_match() {
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(snippet(text, "jumps", 6).unwrap(), "…n fox jumps over…");
    }

    #[test]
    fn test_snippet_without_match_uses_start() {
        let text = "The quick brown fox";
        assert_eq!(snippet(text, "zebra", 4).unwrap(), "The quic…");
        assert_eq!(snippet(text, "", 40).unwrap(), "The quick brown fox");
    }

    #[test]
    fn test_snippet_multibyte() {
        let text = "ääää match öööö";
        assert_eq!(snippet(text, "match", 2).unwrap(), "…ä match ö…");
    }

    #[test]
    fn test_sanitize_self_closing_script_keeps_rest() {
        let policy = SanitizePolicy::default();
        assert_eq!(
            sanitize("intro <script src=x /> the rest of the preview", &policy),
            "intro  the rest of the preview"
        );
    }

    #[test]
    fn test_sanitize_many_bare_ampersands() {
        let policy = SanitizePolicy::default();
        let text = "a & ".repeat(2000);
        let out = sanitize(&text, &policy);
        assert_eq!(out.matches("&amp;").count(), 2000);
        assert!(!out.contains("& "));
    }

    #[test]
    fn test_preview_ignores_script_content() {
        let policy = SanitizePolicy::default();
        let html = "<script>var cli = steal()</script> Install the cli tool";
        let out = preview(html, "cli", 6, &policy).unwrap();
        assert_eq!(out, "…ll the cli tool");
        assert!(!out.contains("steal"));
    }

    #[test]
    fn test_preview_ignores_attribute_text() {
        let policy = SanitizePolicy::default();
        let html = r#"<span title="the config">Intro</span> text about config files"#;
        let out = preview(html, "config", 80, &policy).unwrap();
        assert_eq!(out, "<span>Intro</span> text about config files");
    }

    #[test]
    fn test_preview_balances_cut_elements() {
        let policy = SanitizePolicy::default();
        let html = "Intro <em>some emphasised words about cargo</em> end";
        let out = preview(html, "cargo", 5, &policy).unwrap();
        assert_eq!(out, "…<em>bout cargo</em> end");

        let out = preview(html, "intro", 3, &policy).unwrap();
        assert_eq!(out, "Intro <em>so</em>…");
    }

    #[test]
    fn test_preview_keeps_entities_whole() {
        let policy = SanitizePolicy::default();
        let out = preview("fish &amp; chips", "chips", 3, &policy).unwrap();
        assert_eq!(out, "…&amp; chips");
    }

    #[test]
    fn test_preview_of_empty_text() {
        let policy = SanitizePolicy::default();
        assert_eq!(preview("<script>x</script>", "x", 10, &policy).unwrap(), "");
    }
}
