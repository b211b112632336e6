//! Table of contents components.
//!
//! [`TableOfContents`] renders a [`NavTree`] as nested lists. Every entry is a
//! [`TocNodeView`] that owns its open and hover flags for as long as it is
//! mounted. A closed entry unmounts its children, so reopening starts them
//! from their active state again.
//!
//! Must be rendered inside a `<Router>`: internal links navigate through it.

use docsite_core::{ClickOutcome, NavTree, NodeState, TitleSegment, TocConfig, TocNode, TocTitle};
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

/// Navigation tree of the documentation.
#[component]
pub fn TableOfContents(
    /// The tree to render.
    #[prop(into)]
    tree: Signal<NavTree>,
    /// Slug of the page being viewed.
    #[prop(into)]
    active_section: Signal<String>,
    /// Called after a link entry was clicked, e.g. to close a mobile menu.
    #[prop(default = None)]
    on_click: Option<Callback<()>>,
    /// Depth of the top-level entries.
    #[prop(default = 1)]
    level: usize,
    /// Builds the link of an internal slug, e.g. inside the version being read.
    #[prop(default = None)]
    href: Option<Callback<String, String>>,
) -> impl IntoView {
    view! {
      <nav class="docsite-toc" aria-label="Documentation">
        <ul class="docsite-toc-list">
          <For
            each=move || tree.get().nodes
            key=|node| node.key()
            children=move |node| {
              view! {
                <TocNodeView
                  node=node
                  active_section=active_section
                  level=level
                  on_click=on_click
                  href=href
                />
              }
            }
          />

        </ul>
      </nav>
    }
}

/// One entry of the table of contents and, while open, its subtree.
#[component]
pub fn TocNodeView(
    /// The node to render.
    node: TocNode,
    /// Slug of the page being viewed.
    #[prop(into)]
    active_section: Signal<String>,
    /// Depth of this entry, 1 at the top.
    #[prop(default = 1)]
    level: usize,
    /// Called after a link entry was clicked.
    #[prop(default = None)]
    on_click: Option<Callback<()>>,
    /// Builds the link of an internal slug.
    #[prop(default = None)]
    href: Option<Callback<String, String>>,
) -> impl IntoView {
    let config = use_context::<TocConfig>().unwrap_or_default();
    let node = StoredValue::new(node);

    let initially_active = node.with_value(|n| n.is_active(&active_section.get_untracked()));
    let state = RwSignal::new(NodeState::initial(initially_active));

    // Follow the active section only when its value changes.
    Effect::new(move |previous: Option<String>| {
        let section = active_section.get();
        if let Some(previous) = previous {
            let is_active = node.with_value(|n| n.is_active(&section));
            state.update(|s| {
                s.open = NodeState::on_section_change(s.open, &previous, &section, is_active);
            });
        }
        section
    });

    let is_open = Memo::new(move |_| state.with(|s| s.open));
    let is_hovered = Memo::new(move |_| state.with(|s| s.hovered));
    let is_active = Memo::new(move |_| node.with_value(|n| n.is_active(&active_section.get())));
    let is_selected =
        Memo::new(move |_| node.with_value(|n| n.is_selected(&active_section.get())));

    let (title, is_drawer, is_external, target, has_icon) = node.with_value(|n| {
        (
            n.title.clone(),
            n.is_drawer(),
            n.is_external(),
            n.target().unwrap_or_default().to_string(),
            n.options.tocicon,
        )
    });
    let padding = format!("padding-left: {}rem", config.indent(level));

    let entry = if is_drawer {
        view! {
          <button
            type="button"
            class="docsite-toc-drawer"
            style=padding
            aria-expanded=move || is_open.get().to_string()
            on:click=move |_| {
              node.with_value(|n| activate(n, state, on_click));
            }
          >
            <TocTitleView title=title />
            <span class="docsite-toc-caret" class:open=is_open aria-hidden="true"></span>
          </button>
        }
        .into_any()
    } else if is_external {
        view! {
          <a
            href=target
            class="docsite-toc-link docsite-toc-external"
            style=padding
            target="_blank"
            rel="noopener noreferrer"
            on:click=move |_| {
              node.with_value(|n| activate(n, state, on_click));
            }
          >
            <TocTitleView title=title />
          </a>
        }
        .into_any()
    } else {
        let navigate = use_navigate();
        view! {
          <a
            href=move || resolve_href(href, &target)
            class="docsite-toc-link"
            class:active=is_selected
            style=padding
            aria-current=move || is_selected.get().then_some("page")
            on:click=move |ev: web_sys::MouseEvent| {
              ev.prevent_default();
              let outcome = node.with_value(|n| activate(n, state, on_click));
              if let ClickOutcome::Navigate { target } = outcome {
                navigate(&resolve_href(href, &target), Default::default());
              }
            }
          >
            <TocTitleView title=title />
          </a>
        }
        .into_any()
    };

    let icon = has_icon
        .then(|| {
            let tooltip = config.icon_tooltip.clone();
            let label = tooltip.clone();
            view! {
              <span
                class="docsite-toc-icon"
                tabindex="0"
                aria-label=label
                on:mouseenter=move |_| state.update(|s| s.hovered = true)
                on:mouseleave=move |_| state.update(|s| s.hovered = false)
                on:focus=move |_| state.update(|s| s.hovered = true)
                on:blur=move |_| state.update(|s| s.hovered = false)
              >
                "ⓘ"
                <Show when=move || is_hovered.get()>
                  <span class="docsite-toc-tooltip" role="tooltip">
                    {tooltip.clone()}
                  </span>
                </Show>
              </span>
            }
        });

    let children = move || {
        is_open.get().then(|| {
            let children = node.with_value(|n| n.children.clone());
            view! {
              <ul class="docsite-toc-children">
                {children
                  .into_iter()
                  .map(|child| {
                    view! {
                      <TocNodeView
                        node=child
                        active_section=active_section
                        level=level + 1
                        on_click=on_click
                        href=href
                      />
                    }
                      .into_any()
                  })
                  .collect_view()}
              </ul>
            }
        })
    };

    view! {
      <li class="docsite-toc-node" class:active=is_active data-level=level.to_string()>
        <div class="docsite-toc-entry">{entry} {icon}</div>
        {children}
      </li>
    }
}

/// Title of an entry, plain or formatted.
#[component]
pub fn TocTitleView(
    /// The title to render.
    title: TocTitle,
) -> impl IntoView {
    match title {
        TocTitle::Plain(text) => text.into_any(),
        TocTitle::Segments(segments) => segments_view(&segments).into_any(),
    }
}

fn segments_view(segments: &[TitleSegment]) -> Vec<AnyView> {
    segments.iter().map(segment_view).collect()
}

// Link segments render as spans: the entry itself is already an anchor.
fn segment_view(segment: &TitleSegment) -> AnyView {
    match segment {
        TitleSegment::Text { value } => value.clone().into_any(),
        TitleSegment::Code { value } => view! { <code>{value.clone()}</code> }.into_any(),
        TitleSegment::Emphasis { children } => {
            view! { <em>{segments_view(children)}</em> }.into_any()
        }
        TitleSegment::Strong { children } => {
            view! { <strong>{segments_view(children)}</strong> }.into_any()
        }
        TitleSegment::Link { href, children } => view! {
          <span class="docsite-toc-ref" data-href=href.clone()>
            {segments_view(children)}
          </span>
        }
        .into_any(),
    }
}

/// Absolute router path of a slug.
pub fn slug_href(slug: &str) -> String {
    format!("/{}", slug.trim_start_matches('/'))
}

/// Link of `slug` through `href`, or its plain router path.
pub(crate) fn resolve_href(href: Option<Callback<String, String>>, slug: &str) -> String {
    match href {
        Some(href) => href.run(slug.to_string()),
        None => slug_href(slug),
    }
}

/// Apply a click on `node` to its `state` and run `on_click` for links.
///
/// The callback runs after the state update so it may read the entry.
fn activate(
    node: &TocNode,
    state: RwSignal<NodeState>,
    on_click: Option<Callback<()>>,
) -> ClickOutcome {
    let mut clicked = false;
    let outcome = state
        .try_update(|s| s.click(node, || clicked = true))
        .unwrap_or(ClickOutcome::Ignored);
    if clicked {
        if let Some(on_click) = on_click {
            on_click.run(());
        }
    }
    outcome
}
