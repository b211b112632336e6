//! Docsite Core Library
//!
//! Navigation model, table-of-contents state, version filtering and markup
//! helpers shared by the docsite UI components.

pub mod config;
pub mod error;
pub mod feedback;
pub mod markup;
pub mod search;
pub mod state;
pub mod toc;
pub mod versions;

pub use config::{Config, FeedbackConfig, SearchConfig, SiteConfig, TocConfig};
pub use error::{CoreError, Result};
pub use feedback::{FeedbackEvent, FeedbackState, Rating};
pub use markup::{SanitizePolicy, highlight, preview, sanitize, snippet};
pub use search::{RenderedHit, SearchHit, rank, search_tree};
pub use state::{ClickOutcome, NodeState, RowKind, TocRow, TocState};
pub use toc::{NavTree, NodePath, TitleSegment, TocNode, TocOptions, TocTitle, is_active, is_selected};
pub use versions::{VersionConfig, VersionEntry, VersionFilter, filter_versions};
