//! Content and component sources - slug-keyed loaders behind async traits

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{Document, MarkdownRenderer};
use crate::components::{ComponentSet, Registry};

/// Errors raised by a source that knows the slug but cannot produce it
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to load components for `{slug}`: {message}")]
    Components { slug: String, message: String },
}

/// Opaque handle to a renderable content body
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBody {
    slug: String,
    source: String,
    document: Document,
}

impl ContentBody {
    pub fn parse(slug: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let document = Document::parse(&source);
        Self {
            slug: slug.into(),
            source,
            document,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Raw MDX source
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn render(&self, registry: &Registry, markdown: &MarkdownRenderer) -> String {
        self.document.render(registry, markdown)
    }
}

/// Yields the content body registered for a slug, `Ok(None)` when there is none
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn load(&self, slug: &str) -> Result<Option<ContentBody>, LoadError>;
}

/// Yields the article-local components for a slug, `Ok(None)` when there are none
#[async_trait]
pub trait ComponentSource: Send + Sync {
    async fn load(&self, slug: &str) -> Result<Option<ComponentSet>, LoadError>;
}

/// Content bodies read during a scan.
///
/// The text is captured when the catalog is built, so a snapshot keeps
/// serving the bodies it was scanned with however the files change later.
#[derive(Debug, Default)]
pub struct ScannedContentSource {
    entries: HashMap<String, Scanned>,
}

#[derive(Debug)]
enum Scanned {
    Body(ContentBody),
    Unreadable {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },
}

impl ScannedContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` now and register the outcome under `slug`.
    ///
    /// A missing file registers nothing; any other read error is kept and
    /// reported by every later [`ContentSource::load`] of the slug.
    pub fn read(&mut self, slug: &str, path: &Path) -> bool {
        match fs::read_to_string(path) {
            Ok(source) => {
                self.entries
                    .insert(slug.to_string(), Scanned::Body(ContentBody::parse(slug, source)));
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                self.entries.insert(
                    slug.to_string(),
                    Scanned::Unreadable {
                        path: path.to_path_buf(),
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                );
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ContentSource for ScannedContentSource {
    async fn load(&self, slug: &str) -> Result<Option<ContentBody>, LoadError> {
        match self.entries.get(slug) {
            Some(Scanned::Body(body)) => Ok(Some(body.clone())),
            Some(Scanned::Unreadable {
                path,
                kind,
                message,
            }) => Err(LoadError::Io {
                path: path.clone(),
                source: io::Error::new(*kind, message.clone()),
            }),
            None => Ok(None),
        }
    }
}

/// Content bodies held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryContentSource {
    bodies: HashMap<String, String>,
}

impl MemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slug: impl Into<String>, source: impl Into<String>) {
        self.bodies.insert(slug.into(), source.into());
    }

    pub fn with(mut self, slug: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(slug, source);
        self
    }
}

#[async_trait]
impl ContentSource for MemoryContentSource {
    async fn load(&self, slug: &str) -> Result<Option<ContentBody>, LoadError> {
        Ok(self
            .bodies
            .get(slug)
            .map(|source| ContentBody::parse(slug, source.as_str())))
    }
}

/// Component sets registered up front, one per slug
#[derive(Debug, Clone, Default)]
pub struct StaticComponentSource {
    sets: HashMap<String, ComponentSet>,
}

impl StaticComponentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slug: impl Into<String>, set: ComponentSet) {
        self.sets.insert(slug.into(), set);
    }

    pub fn with(mut self, slug: impl Into<String>, set: ComponentSet) -> Self {
        self.insert(slug, set);
        self
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[async_trait]
impl ComponentSource for StaticComponentSource {
    async fn load(&self, slug: &str) -> Result<Option<ComponentSet>, LoadError> {
        Ok(self.sets.get(slug).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_scanned_source_keeps_text_read_at_scan() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.mdx");
        std::fs::write(&path, "# Hello\n\n<Alert>hi</Alert>").unwrap();

        let mut source = ScannedContentSource::new();
        assert!(source.read("hello", &path));

        std::fs::write(&path, "rewritten").unwrap();
        let body = source.load("hello").await.unwrap().unwrap();
        assert_eq!(body.slug(), "hello");
        assert!(body.document().component_names().contains("Alert"));

        std::fs::remove_file(&path).unwrap();
        assert!(source.load("hello").await.unwrap().is_some());
        assert!(source.load("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scanned_source_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let mut source = ScannedContentSource::new();
        assert!(!source.read("gone", &dir.path().join("gone.mdx")));
        assert!(source.is_empty());
        assert!(source.load("gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scanned_source_unreadable_path_is_error() {
        let dir = TempDir::new().unwrap();
        let mut source = ScannedContentSource::new();
        // A directory cannot be read as a string
        assert!(!source.read("dir", dir.path()));
        for _ in 0..2 {
            assert!(matches!(
                source.load("dir").await,
                Err(LoadError::Io { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_memory_sources() {
        let content = MemoryContentSource::new().with("a", "text");
        assert_eq!(content.load("a").await.unwrap().unwrap().source(), "text");
        assert!(content.load("b").await.unwrap().is_none());

        let components = StaticComponentSource::new().with("a", ComponentSet::new());
        assert!(components.load("a").await.unwrap().is_some());
        assert!(components.load("b").await.unwrap().is_none());
    }
}
