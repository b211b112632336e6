//! Search components.
//!
//! Provides SearchBox, SearchResults and SearchResultCard. Titles and
//! previews come from the search index and are only ever inserted as HTML
//! after going through the sanitizing highlighter.

use docsite_core::{RenderedHit, SearchConfig, SearchHit, rank, sanitize};
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::toc::resolve_href;

/// Search box input component.
#[component]
pub fn SearchBox(
    /// Placeholder text for the input.
    #[prop(default = "Search the docs...".to_string())]
    placeholder: String,
    /// Signal to track the current query.
    query: RwSignal<String>,
    /// Whether search is loading.
    #[prop(default = false.into())]
    loading: Signal<bool>,
) -> impl IntoView {
    view! {
      <div class="docsite-search-box" role="search">
        <input
          type="search"
          class="docsite-search-input"
          placeholder=placeholder
          aria-label="Search"
          prop:value=move || query.get()
          on:input=move |ev| query.set(event_target_value(&ev))
        />
        <Show when=move || loading.get()>
          <span class="docsite-search-spinner" aria-label="Loading"></span>
        </Show>
      </div>
    }
}

/// Ranked list of search hits.
#[component]
pub fn SearchResults(
    /// The hits to display.
    #[prop(into)]
    hits: Signal<Vec<SearchHit>>,
    /// The current query, highlighted in each card.
    #[prop(into)]
    query: Signal<String>,
    /// Called with the hit the reader picked.
    #[prop(default = None)]
    on_select: Option<Callback<SearchHit>>,
    /// Builds the link of a hit's slug.
    #[prop(default = None)]
    href: Option<Callback<String, String>>,
) -> impl IntoView {
    let config = use_context::<SearchConfig>().unwrap_or_default();
    let max_results = config.max_results;
    let ranked = Memo::new(move |_| rank(hits.get(), max_results));

    view! {
      <div class="docsite-search-results">
        <Show
          when=move || !ranked.with(Vec::is_empty)
          fallback=move || {
            let q = query.get();
            if q.trim().is_empty() {
              view! { <div class="docsite-search-empty"></div> }.into_any()
            } else {
              view! {
                <div class="docsite-search-no-results">"No results found for \"" {q} "\""</div>
              }
                .into_any()
            }
          }
        >

          <ul class="docsite-search-list">
            <For
              each=move || ranked.get()
              key=|hit| hit.slug.clone()
              children=move |hit| {
                view! { <SearchResultCard hit=hit query=query on_select=on_select href=href /> }
              }
            />

          </ul>
        </Show>
      </div>
    }
}

/// A single search hit with highlighted title and preview.
#[component]
pub fn SearchResultCard(
    /// The hit to display.
    hit: SearchHit,
    /// The current query.
    #[prop(into)]
    query: Signal<String>,
    /// Called when the card is activated.
    #[prop(default = None)]
    on_select: Option<Callback<SearchHit>>,
    /// Builds the link of the hit's slug.
    #[prop(default = None)]
    href: Option<Callback<String, String>>,
) -> impl IntoView {
    let config = StoredValue::new(use_context::<SearchConfig>().unwrap_or_default());
    let hit = StoredValue::new(hit);
    let rendered = Memo::new(move |_| {
        let query = query.get();
        hit.with_value(|hit| config.with_value(|config| render_hit(hit, &query, config)))
    });

    let navigate = use_navigate();
    let link = move || hit.with_value(|hit| resolve_href(href, &hit.slug));

    view! {
      <li class="docsite-search-item">
        <a
          href=link
          class="docsite-search-link"
          on:click=move |ev: web_sys::MouseEvent| {
            ev.prevent_default();
            let destination = link();
            if let Some(on_select) = on_select {
              on_select.run(hit.get_value());
            }
            navigate(&destination, Default::default());
          }
        >
          <span
            class="docsite-search-title"
            inner_html=move || rendered.with(|r| r.title_html.clone())
          ></span>
          <Show when=move || rendered.with(|r| !r.breadcrumbs.is_empty())>
            <span class="docsite-search-breadcrumbs">
              {move || rendered.with(|r| r.breadcrumbs.clone())}
            </span>
          </Show>
          <Show when=move || rendered.with(|r| r.preview_html.is_some())>
            <span
              class="docsite-search-preview"
              inner_html=move || rendered.with(|r| r.preview_html.clone().unwrap_or_default())
            ></span>
          </Show>
        </a>
      </li>
    }
}

/// Highlighted hit, falling back to sanitized text without highlights.
fn render_hit(hit: &SearchHit, query: &str, config: &SearchConfig) -> RenderedHit {
    hit.render(query, config).unwrap_or_else(|err| {
        log::warn!("could not highlight search hit {}: {err}", hit.slug);
        RenderedHit {
            slug: hit.slug.clone(),
            title_html: sanitize(&hit.title, &config.sanitize),
            preview_html: hit
                .preview
                .as_deref()
                .map(|preview| sanitize(preview, &config.sanitize)),
            breadcrumbs: hit.breadcrumbs.join(" › "),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_hit_highlights() {
        let hit = SearchHit::new("Configuration", "reference/config")
            .with_preview("Set <em>options</em> in docsite.toml");
        let rendered = render_hit(&hit, "options", &SearchConfig::default());

        assert_eq!(rendered.title_html, "Configuration");
        assert_eq!(
            rendered.preview_html.as_deref(),
            Some("Set <em><mark>options</mark></em> in docsite.toml")
        );
    }

    #[test]
    fn test_render_hit_never_passes_raw_markup() {
        let hit = SearchHit::new("<img src=x onerror=alert(1)>Title", "a")
            .with_preview("<script>alert(1)</script>body");
        let rendered = render_hit(&hit, "", &SearchConfig::default());

        assert_eq!(rendered.title_html, "Title");
        assert_eq!(rendered.preview_html.as_deref(), Some("body"));
    }

    #[test]
    fn test_search_hit_serialization() {
        let hit = SearchHit::new("Test", "test");
        let json = serde_json::to_string(&hit).unwrap();
        assert!(json.contains("\"slug\":\"test\""));
        assert!(json.contains("\"title\":\"Test\""));
    }
}
