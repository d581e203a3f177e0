//! Catalog snapshots with atomic replacement.
//!
//! A [`Catalog`] bundles everything one deployment of the content knows:
//! the metadata store, the content source and the article component source.
//! [`CatalogHandle`] swaps whole catalogs with `arc-swap`, so a reader that
//! took a snapshot sees metadata and bodies from the same scan even while a
//! re-scan is being published.

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{
    ComponentSource, ContentSource, MemoryContentSource, MetadataIndex, MetadataStore,
    StaticComponentSource,
};

/// One immutable deployment of the content
pub struct Catalog {
    metadata: Box<dyn MetadataStore>,
    content: Box<dyn ContentSource>,
    components: Box<dyn ComponentSource>,
    asset_dirs: HashMap<String, String>,
}

impl Catalog {
    pub fn new(
        metadata: impl MetadataStore + 'static,
        content: impl ContentSource + 'static,
        components: impl ComponentSource + 'static,
    ) -> Self {
        Self {
            metadata: Box::new(metadata),
            content: Box::new(content),
            components: Box::new(components),
            asset_dirs: HashMap::new(),
        }
    }

    /// Site-relative directory each article's images are served from, by slug
    pub fn with_asset_dirs(mut self, asset_dirs: HashMap<String, String>) -> Self {
        self.asset_dirs = asset_dirs;
        self
    }

    /// A catalog with no articles
    pub fn empty() -> Self {
        Self::new(
            MetadataIndex::default(),
            MemoryContentSource::new(),
            StaticComponentSource::new(),
        )
    }

    pub fn metadata(&self) -> &dyn MetadataStore {
        self.metadata.as_ref()
    }

    pub fn content(&self) -> &dyn ContentSource {
        self.content.as_ref()
    }

    pub fn components(&self) -> &dyn ComponentSource {
        self.components.as_ref()
    }

    pub fn asset_dir(&self, slug: &str) -> Option<&str> {
        self.asset_dirs.get(slug).map(String::as_str)
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("articles", &self.metadata.all().len())
            .finish_non_exhaustive()
    }
}

/// Shared, atomically replaceable catalog
pub struct CatalogHandle {
    current: ArcSwap<Catalog>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
        }
    }

    /// The catalog as of now; stays valid after a later [`CatalogHandle::replace`]
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// Publish a new catalog in one step
    pub fn replace(&self, catalog: Catalog) {
        let count = catalog.metadata().all().len();
        self.current.store(Arc::new(catalog));
        tracing::info!("Catalog replaced ({} articles)", count);
    }
}

impl fmt::Debug for CatalogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CatalogHandle")
            .field(&*self.current.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::article;

    fn catalog_with(slug: &str, body: &str) -> Catalog {
        Catalog::new(
            MetadataIndex::new(vec![article(slug, "2025-05-13", true)]).unwrap(),
            MemoryContentSource::new().with(slug, body),
            StaticComponentSource::new(),
        )
    }

    #[tokio::test]
    async fn test_snapshot_survives_replace() {
        let handle = CatalogHandle::new(catalog_with("old", "old body"));
        let before = handle.snapshot();

        handle.replace(catalog_with("new", "new body"));
        let after = handle.snapshot();

        // The old snapshot still answers from the old deployment only
        assert!(before.metadata().get("old").is_some());
        assert!(before.metadata().get("new").is_none());
        let body = before.content().load("old").await.unwrap().unwrap();
        assert_eq!(body.source(), "old body");

        assert!(after.metadata().get("old").is_none());
        let body = after.content().load("new").await.unwrap().unwrap();
        assert_eq!(body.source(), "new body");
    }

    #[test]
    fn test_empty_catalog() {
        let handle = CatalogHandle::new(Catalog::empty());
        assert!(handle.snapshot().metadata().all().is_empty());
    }
}
