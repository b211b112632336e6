//! Docsite UI Components
//!
//! Leptos components for the docsite frontend.
//!
//! # Components
//!
//! ## Navigation
//! - [`TableOfContents`] - Recursive documentation tree
//! - [`TocNodeView`] - One tree entry with its open subtree
//!
//! ## Versions
//! - [`VersionDropdown`] - Switch between published versions
//!
//! ## Search
//! - [`SearchBox`] - Text input bound to the query
//! - [`SearchResults`] - Ranked list of hits
//! - [`SearchResultCard`] - Highlighted hit
//!
//! ## Feedback
//! - [`FeedbackWidget`] - Emoji page rating
//!
//! Settings are read from context; call [`provide_site_config`] once near the
//! root of the app.
//!
//! # Example
//!
//! ```ignore
//! use docsite_core::NavTree;
//! use leptos::prelude::*;
//! use docsite_ui::TableOfContents;
//!
//! #[component]
//! fn Sidebar(tree: NavTree) -> impl IntoView {
//!     let section = RwSignal::new("guide/install".to_string());
//!
//!     view! { <TableOfContents tree=tree active_section=section /> }
//! }
//! ```

pub mod feedback;
pub mod search;
pub mod toc;
pub mod versions;

use docsite_core::Config;
use leptos::prelude::provide_context;

pub use feedback::FeedbackWidget;
pub use search::{SearchBox, SearchResultCard, SearchResults};
pub use toc::{TableOfContents, TocNodeView, TocTitleView};
pub use versions::VersionDropdown;

/// Make the component settings of `config` available to every component below.
pub fn provide_site_config(config: &Config) {
    provide_context(config.site.clone());
    provide_context(config.toc.clone());
    provide_context(config.search.clone());
    provide_context(config.versions.clone());
    provide_context(config.feedback.clone());
}
