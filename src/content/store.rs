//! Metadata store - enumerates articles and answers exact slug lookups

use std::collections::HashMap;
use thiserror::Error;

use super::ArticleMetadata;

/// Errors that make a set of articles unusable as a whole
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate slug `{slug}`")]
    DuplicateSlug { slug: String },
}

/// Read-only access to article metadata
pub trait MetadataStore: Send + Sync {
    /// All records, in store order
    fn all(&self) -> &[ArticleMetadata];

    /// Exact slug match
    fn get(&self, slug: &str) -> Option<&ArticleMetadata>;
}

/// In-memory metadata store keyed by slug
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    records: Vec<ArticleMetadata>,
    by_slug: HashMap<String, usize>,
}

impl MetadataIndex {
    /// Build an index, rejecting duplicate slugs
    pub fn new(records: Vec<ArticleMetadata>) -> Result<Self, CatalogError> {
        let mut by_slug = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if by_slug.insert(record.slug.clone(), i).is_some() {
                return Err(CatalogError::DuplicateSlug {
                    slug: record.slug.clone(),
                });
            }
        }
        Ok(Self { records, by_slug })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MetadataStore for MetadataIndex {
    fn all(&self) -> &[ArticleMetadata] {
        &self.records
    }

    fn get(&self, slug: &str) -> Option<&ArticleMetadata> {
        self.by_slug.get(slug).map(|&i| &self.records[i])
    }
}
