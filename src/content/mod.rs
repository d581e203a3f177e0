//! Content module - article metadata, content bodies and the catalog

mod catalog;
mod document;
pub mod loader;
mod markdown;
mod metadata;
mod source;
mod store;

pub use catalog::{Catalog, CatalogHandle};
pub use document::{Document, Node};
pub use loader::ArticleScanner;
pub use markdown::MarkdownRenderer;
pub use metadata::{is_valid_slug, parse_date, ArticleMetadata, Author, MetadataError};
pub use source::{
    ComponentSource, ContentBody, ContentSource, LoadError, MemoryContentSource,
    ScannedContentSource, StaticComponentSource,
};
pub use store::{CatalogError, MetadataIndex, MetadataStore};
