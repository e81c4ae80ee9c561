//! Site building for geode.
//!
//! Turns a content directory of markdown notes and assets into a static
//! site:
//!
//! - [`discover`] walks the content root into sorted [`FileEntry`] values
//! - [`parse_front_matter`] decodes the YAML block at the top of a document
//! - [`is_included`] applies the [`BuildMode`](geode_config::BuildMode)
//! - [`FileTree`] summarizes the built pages for navigation
//! - [`OutputWriter`] persists rendered pages; [`HtmlWriter`] is the default
//! - [`SiteBuilder`] runs the whole pipeline as one rebuild
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use geode_config::Config;
//! use geode_site::SiteBuilder;
//!
//! let config = Config::load(None, None)?;
//! let builder = SiteBuilder::from_config(&config);
//! let report = builder.rebuild(false)?;
//! println!("{} pages", report.pages);
//! # Ok(())
//! # }
//! ```

mod assets;
mod builder;
mod discovery;
mod error;
mod filter;
mod front_matter;
mod ignore;
mod output;
mod page;
mod slug;
mod stats;
mod tree;

pub use assets::{asset_destination, copy_assets, copy_theme_assets};
pub use builder::{BuildReport, SiteBuilder, SiteOptions};
pub use discovery::{ASSET_EXTENSIONS, FileEntry, discover};
pub use error::{MetadataError, SiteError};
pub use filter::is_included;
pub use front_matter::{FrontMatter, parse_front_matter, split_front_matter};
pub use ignore::IgnoreRules;
pub use output::{HtmlWriter, OutputWriter, PageOutput};
pub use page::SourceDocument;
pub use slug::path_to_slug;
pub use stats::{count_words, reading_time};
pub use tree::{FileTree, TreeNode};
