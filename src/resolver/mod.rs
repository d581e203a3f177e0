//! Content resolver - slug in, renderable article out
//!
//! Resolution takes one catalog snapshot and runs every step against it:
//!
//! 1. metadata by exact slug, or [`ResolveError::MetadataMissing`]
//! 2. content body, or [`ResolveError::ContentMissing`]
//! 3. article-local components; absence is an empty set
//! 4. merge with the global set through [`Registry::build`]
//!
//! Resolution does not look at `published`: drafts are reachable by slug.
//! Only [`Resolver::list_published`] filters.

use std::sync::Arc;
use thiserror::Error;

use crate::components::{ComponentSet, Registry};
use crate::content::{
    ArticleMetadata, Catalog, CatalogHandle, ContentBody, LoadError, MarkdownRenderer,
};

/// Which part of an article could not be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    /// No metadata for the slug; an ordinary 404
    MetadataMissing,
    /// Metadata without a content body; a broken deployment
    ContentMissing,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no article with slug `{slug}`")]
    MetadataMissing { slug: String },
    #[error("article `{slug}` has metadata but its content body is missing")]
    ContentMissing {
        slug: String,
        #[source]
        source: Option<LoadError>,
    },
}

impl ResolveError {
    pub fn kind(&self) -> NotFoundKind {
        match self {
            Self::MetadataMissing { .. } => NotFoundKind::MetadataMissing,
            Self::ContentMissing { .. } => NotFoundKind::ContentMissing,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::MetadataMissing { slug } | Self::ContentMissing { slug, .. } => slug,
        }
    }
}

/// Everything needed to render one article
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArticle {
    pub metadata: ArticleMetadata,
    pub content: ContentBody,
    pub components: Registry,
    /// Site-relative directory of the article's own files
    pub asset_dir: Option<String>,
}

impl ResolvedArticle {
    /// Render the content body through the merged registry
    pub fn render(&self, markdown: &MarkdownRenderer) -> String {
        self.content.render(&self.components, markdown)
    }
}

/// Resolves slugs against the current catalog
#[derive(Debug)]
pub struct Resolver {
    catalog: Arc<CatalogHandle>,
    globals: ComponentSet,
    critical: Vec<String>,
}

impl Resolver {
    pub fn new(catalog: Arc<CatalogHandle>, globals: ComponentSet) -> Self {
        Self {
            catalog,
            globals,
            critical: Vec::new(),
        }
    }

    /// Components whose absence from a merged registry is logged
    pub fn with_critical_components(mut self, names: Vec<String>) -> Self {
        self.critical = names;
        self
    }

    pub fn catalog(&self) -> &Arc<CatalogHandle> {
        &self.catalog
    }

    pub fn globals(&self) -> &ComponentSet {
        &self.globals
    }

    /// Published articles, newest first; equal dates keep store order
    pub fn list_published(&self) -> Vec<ArticleMetadata> {
        published_sorted(&self.catalog.snapshot())
    }

    /// Every article including drafts, newest first
    pub fn list_all(&self) -> Vec<ArticleMetadata> {
        let mut articles = self.catalog.snapshot().metadata().all().to_vec();
        articles.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        articles
    }

    pub async fn resolve(&self, slug: &str) -> Result<ResolvedArticle, ResolveError> {
        let catalog = self.catalog.snapshot();

        let metadata = catalog
            .metadata()
            .get(slug)
            .cloned()
            .ok_or_else(|| ResolveError::MetadataMissing {
                slug: slug.to_string(),
            })?;

        let content = match catalog.content().load(slug).await {
            Ok(Some(content)) => content,
            Ok(None) => {
                tracing::error!("Article `{}` has metadata but no content body", slug);
                return Err(ResolveError::ContentMissing {
                    slug: slug.to_string(),
                    source: None,
                });
            }
            Err(e) => {
                tracing::error!("Failed to load content for `{}`: {}", slug, e);
                return Err(ResolveError::ContentMissing {
                    slug: slug.to_string(),
                    source: Some(e),
                });
            }
        };

        let local = match catalog.components().load(slug).await {
            Ok(Some(set)) => set,
            Ok(None) => {
                tracing::debug!("No local components for `{}`", slug);
                ComponentSet::new()
            }
            Err(e) => {
                tracing::warn!("Ignoring local components for `{}`: {}", slug, e);
                ComponentSet::new()
            }
        };

        let components = Registry::build(&self.globals, &local);
        for name in components.missing(&self.critical) {
            tracing::warn!(
                "Critical component `{}` is missing from both global and local components of `{}`",
                name,
                slug
            );
        }

        Ok(ResolvedArticle {
            asset_dir: catalog.asset_dir(slug).map(str::to_string),
            metadata,
            content,
            components,
        })
    }
}

fn published_sorted(catalog: &Catalog) -> Vec<ArticleMetadata> {
    let mut articles: Vec<_> = catalog
        .metadata()
        .all()
        .iter()
        .filter(|m| m.published)
        .cloned()
        .collect();
    // sort_by is stable, so equal dates keep store order
    articles.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
    articles
}
