use docsite_core::{
    Config, FeedbackEvent, NavTree, SearchHit, VersionEntry, filter_versions, search_tree,
    versions::{current_version, strip_version},
};
use docsite_ui::{
    FeedbackWidget, SearchBox, SearchResults, TableOfContents, VersionDropdown,
    provide_site_config,
};
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    components::{Route, Router, Routes},
    hooks::use_location,
    path,
};

const SITE_CONFIG: &str = include_str!("../content/docsite.toml");
const NAVIGATION: &str = include_str!("../content/navigation.json");

/// Everything the pages need, loaded once at startup.
#[derive(Debug, Clone)]
pub struct SiteData {
    pub config: Config,
    pub tree: NavTree,
    pub versions: Vec<VersionEntry>,
}

impl SiteData {
    /// Load the bundled configuration and navigation tree.
    pub fn load() -> docsite_core::Result<Self> {
        let config = Config::from_toml_str(SITE_CONFIG)?;
        let tree = NavTree::from_json(NAVIGATION)?;
        tree.validate()?;
        let versions = filter_versions(&config.site.branches, &config.versions)?;

        log::debug!(
            "loaded {} navigation nodes and {} versions",
            tree.len(),
            versions.len()
        );
        Ok(Self {
            config,
            tree,
            versions,
        })
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    let site = match SiteData::load() {
        Ok(site) => site,
        Err(err) => {
            log::error!("failed to load site data: {err}");
            return view! { <p class="docsite-error">"The documentation could not be loaded."</p> }
                .into_any();
        }
    };
    provide_site_config(&site.config);
    provide_context(site);

    view! {
      <Router>
        <Routes fallback=|| "Page not found.".into_view()>
          <Route path=path!("/*any") view=DocsPage />
        </Routes>
      </Router>
    }
    .into_any()
}

/// Layout of every documentation page.
#[component]
fn DocsPage() -> impl IntoView {
    let SiteData {
        config,
        tree,
        versions,
    } = expect_context::<SiteData>();
    let site_title = config.site.title.clone();
    let pathname = use_location().pathname;
    let route = {
        let site = config.site.clone();
        Signal::derive(move || site.strip_base(&pathname.get()).to_string())
    };

    let active_section = {
        let versions = versions.clone();
        Signal::derive(move || strip_version(&route.get(), &versions).to_string())
    };
    let current_entry = {
        let versions = versions.clone();
        Signal::derive(move || current_version(&route.get(), &versions).cloned())
    };
    let current = Signal::derive(move || {
        current_entry
            .get()
            .map(|entry| entry.name)
            .unwrap_or_default()
    });
    // Internal links stay inside the version being read.
    let href = Callback::new(move |slug: String| {
        config.link_for(current_entry.get().as_ref(), &slug)
    });

    let page_title = {
        let tree = tree.clone();
        let fallback = site_title.clone();
        Signal::derive(move || {
            let section = active_section.get();
            tree.active_chain(&section)
                .last()
                .and_then(|path| tree.get(path))
                .map(|node| node.title.plain_text())
                .unwrap_or_else(|| fallback.clone())
        })
    };

    let menu_open = RwSignal::new(false);
    let close_menu = Callback::new(move |()| menu_open.set(false));

    let query = RwSignal::new(String::new());
    let hits = {
        let tree = tree.clone();
        Signal::derive(move || search_tree(&tree, &query.get()))
    };
    let on_select = Callback::new(move |hit: SearchHit| {
        log::debug!("search result picked: {}", hit.slug);
        query.set(String::new());
    });
    let on_feedback = Callback::new(|event: FeedbackEvent| {
        log::info!(
            "page feedback: {} rated {:?} ({})",
            event.page,
            event.rating,
            event.score
        );
    });

    view! {
      <Title text=move || page_title.get() />
      <div class="docsite-layout">
        <header class="docsite-header">
          <button
            type="button"
            class="docsite-menu-toggle"
            aria-expanded=move || menu_open.get().to_string()
            on:click=move |_| menu_open.update(|open| *open = !*open)
          >
            "Menu"
          </button>
          <span class="docsite-site-title">{site_title}</span>
          <VersionDropdown versions=versions current=current slug=active_section />
          <SearchBox query=query />
        </header>
        <SearchResults hits=hits query=query on_select=Some(on_select) href=Some(href) />
        <aside class="docsite-sidebar" class:open=move || menu_open.get()>
          <TableOfContents
            tree=tree
            active_section=active_section
            on_click=Some(close_menu)
            href=Some(href)
          />
        </aside>
        <main class="docsite-content">
          <h1>{move || page_title.get()}</h1>
          <FeedbackWidget page=active_section on_feedback=Some(on_feedback) />
        </main>
      </div>
    }
}
