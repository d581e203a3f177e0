//! Content scanner - builds a [`Catalog`] from the articles directory
//!
//! Each article lives in its own directory:
//!
//! ```text
//! content/articles/first-post/
//!     metadata.yml
//!     index.mdx
//!     components/Demo.html
//! ```

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{
    ArticleMetadata, Catalog, MetadataIndex, ScannedContentSource, StaticComponentSource,
};
use crate::components::load_template_dir;

const METADATA_FILES: [&str; 2] = ["metadata.yml", "metadata.yaml"];
const CONTENT_FILES: [&str; 2] = ["index.mdx", "index.md"];
const COMPONENTS_DIR: &str = "components";
const DEFAULT_URL_PREFIX: &str = "content/articles";

/// Scans an articles directory into a catalog
pub struct ArticleScanner {
    content_dir: PathBuf,
    url_prefix: String,
}

impl ArticleScanner {
    pub fn new<P: AsRef<Path>>(content_dir: P) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        }
    }

    /// Site-relative path the articles directory is served under
    pub fn with_url_prefix(mut self, prefix: &str) -> Self {
        self.url_prefix = prefix.trim_matches('/').to_string();
        self
    }

    /// Scan every article directory.
    ///
    /// Directories are visited in file-name order, which becomes the store
    /// order. Content bodies are read here, so the catalog does not follow
    /// later edits. Unreadable metadata is skipped; a duplicate slug fails
    /// the scan.
    pub fn scan(&self) -> Result<Catalog> {
        if !self.content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", self.content_dir);
            return Ok(Catalog::empty());
        }

        let mut records = Vec::new();
        let mut content = ScannedContentSource::new();
        let mut asset_dirs = HashMap::new();
        let mut components = StaticComponentSource::new();

        for entry in WalkDir::new(&self.content_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }

            let content_path = find_file(dir, &CONTENT_FILES);
            let Some(metadata_path) = find_file(dir, &METADATA_FILES) else {
                if content_path.is_some() {
                    tracing::warn!("Skipping {:?}: content without metadata.yml", dir);
                }
                continue;
            };

            let metadata = match ArticleMetadata::load(&metadata_path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Failed to load {:?}: {}", metadata_path, e);
                    continue;
                }
            };
            let slug = metadata.slug.clone();

            match content_path {
                Some(path) => {
                    content.read(&slug, &path);
                }
                None => tracing::warn!("Article `{}` has no index.mdx in {:?}", slug, dir),
            }

            let dir_name = entry.file_name().to_string_lossy();
            asset_dirs.insert(slug.clone(), format!("{}/{}", self.url_prefix, dir_name));

            match load_template_dir(&dir.join(COMPONENTS_DIR)) {
                Ok(set) if !set.is_empty() => {
                    tracing::debug!(
                        "Article `{}` registers components: {}",
                        slug,
                        set.names().collect::<Vec<_>>().join(", ")
                    );
                    components.insert(slug.clone(), set);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to load components for `{}`: {}", slug, e),
            }

            tracing::debug!("Scanned article `{}` from {:?}", slug, dir);
            records.push(metadata);
        }

        let index = MetadataIndex::new(records)?;
        tracing::info!(
            "Scanned {} articles ({} with local components)",
            index.len(),
            components.len()
        );

        Ok(Catalog::new(index, content, components).with_asset_dirs(asset_dirs))
    }
}

fn find_file(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
