//! Version selector dropdown.

use docsite_core::{SiteConfig, VersionConfig, VersionEntry};
use leptos::prelude::*;

/// Dropdown listing the published versions of the docs.
///
/// Each entry links to the current page in that version, so switching keeps
/// the reader where they are.
#[component]
pub fn VersionDropdown(
    /// Entries in display order.
    #[prop(into)]
    versions: Signal<Vec<VersionEntry>>,
    /// Name of the version being viewed.
    #[prop(into)]
    current: Signal<String>,
    /// Slug of the page being viewed, without the version segment.
    #[prop(into)]
    slug: Signal<String>,
) -> impl IntoView {
    let config = StoredValue::new(use_context::<VersionConfig>().unwrap_or_default());
    let site = StoredValue::new(use_context::<SiteConfig>().unwrap_or_default());
    let open = RwSignal::new(false);

    let current_label = move || {
        let current = current.get();
        versions.with(|versions| {
            versions
                .iter()
                .find(|entry| entry.name == current)
                .map_or(current.clone(), |entry| entry.label.clone())
        })
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" {
            open.set(false);
        }
    };

    view! {
      <div class="docsite-versions" on:keydown=on_keydown>
        <button
          type="button"
          class="docsite-versions-toggle"
          aria-haspopup="listbox"
          aria-expanded=move || open.get().to_string()
          on:click=move |_| open.update(|open| *open = !*open)
        >
          {current_label}
          <span class="docsite-versions-caret" aria-hidden="true">
            "▾"
          </span>
        </button>
        <Show when=move || open.get()>
          <ul class="docsite-versions-menu" role="listbox">
            <For
              each=move || versions.get()
              key=|entry| entry.name.clone()
              children=move |entry| {
                let name = entry.name.clone();
                let is_current = Memo::new(move |_| current.get() == name);
                let href = {
                  let entry = entry.clone();
                  move || {
                    let url = config.with_value(|config| config.url_for(&entry, &slug.get()));
                    site.with_value(|site| site.path_for(&url))
                  }
                };
                view! {
                  <li role="option" aria-selected=move || is_current.get().to_string()>
                    <a
                      href=href
                      class="docsite-versions-link"
                      class:active=is_current
                      on:click=move |_| open.set(false)
                    >
                      {entry.label.clone()}
                    </a>
                  </li>
                }
              }
            />

          </ul>
        </Show>
      </div>
    }
}
