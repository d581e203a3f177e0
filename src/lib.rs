//! mdx-blog: an MDX blog engine with per-article components
//!
//! Articles are directories of `metadata.yml` plus `index.mdx`. A slug is
//! resolved against an atomically swappable catalog into metadata, a content
//! body and a component registry that merges the site-wide components with
//! the article's own.

pub mod commands;
pub mod components;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod resolver;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use components::{builtin_components, load_template_dir, ComponentSet};
use content::{ArticleScanner, Catalog, CatalogHandle, MarkdownRenderer};
use resolver::Resolver;
use templates::PageRenderer;

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Article directories live here
    pub content_dir: PathBuf,
    /// Site-wide component templates
    pub components_dir: PathBuf,
    /// Copied verbatim into the output
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let components_dir = base_dir.join(&config.components_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            components_dir,
            static_dir,
            public_dir,
        })
    }

    /// Scan the content directory into a fresh catalog
    pub fn scan(&self) -> Result<Catalog> {
        ArticleScanner::new(&self.content_dir)
            .with_url_prefix(&self.config.content_dir)
            .scan()
    }

    /// Built-in components, overridden by the site's component templates
    pub fn global_components(&self) -> Result<ComponentSet> {
        let mut globals = builtin_components();
        globals.extend_from(&load_template_dir(&self.components_dir)?);
        Ok(globals)
    }

    pub fn markdown(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_options(&self.config.highlight)
    }

    /// A resolver over a freshly scanned catalog
    pub fn resolver(&self) -> Result<Resolver> {
        let catalog = Arc::new(CatalogHandle::new(self.scan()?));
        Ok(Resolver::new(catalog, self.global_components()?)
            .with_critical_components(self.config.critical_components.clone()))
    }

    pub fn pages(&self) -> Result<PageRenderer> {
        PageRenderer::new(self.config.clone(), self.markdown())
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
