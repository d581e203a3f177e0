//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub components_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Writing
    pub render_drafts: bool,
    pub default_og_image: String,
    #[serde(default)]
    pub critical_components: Vec<String>,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Serving
    #[serde(default)]
    pub cache: CacheConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Vibe Coding Blog".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content/articles".to_string(),
            components_dir: "components".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            render_drafts: false,
            default_og_image: "/images/og-default.png".to_string(),
            critical_components: vec!["YouTube".to_string(), "Tweet".to_string()],
            highlight: HighlightConfig::default(),

            cache: CacheConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Join a site-relative path onto `url` + `root`
    pub fn permalink(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.url.trim_end_matches('/'),
            self.root,
            path.trim_start_matches('/')
        )
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

/// Cache-Control lifetimes (seconds) used by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub article_max_age: u32,
    pub og_image_max_age: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            article_max_age: 3600,
            og_image_max_age: 86400,
        }
    }
}
