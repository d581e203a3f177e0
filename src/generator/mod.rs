//! Static site generator - renders every listed article to public/

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::ArticleMetadata;
use crate::resolver::{ResolveError, Resolver};
use crate::templates::PageRenderer;
use crate::Blog;

/// Entry of `articles.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleEntry {
    pub slug: String,
    pub has_custom_og_image: bool,
}

impl From<&ArticleMetadata> for ArticleEntry {
    fn from(article: &ArticleMetadata) -> Self {
        Self {
            slug: article.slug.clone(),
            has_custom_og_image: article.og_image.is_some(),
        }
    }
}

/// Counts reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub articles: usize,
    pub broken: usize,
}

pub struct Generator {
    blog: Blog,
    pages: PageRenderer,
}

impl Generator {
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            pages: blog.pages()?,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self, resolver: &Resolver) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        self.copy_dir(&self.blog.static_dir, &self.blog.public_dir)?;
        self.copy_article_assets()?;

        let published = resolver.list_published();
        let listed = if self.blog.config.render_drafts {
            resolver.list_all()
        } else {
            published.clone()
        };

        let html = self.pages.index_page(&published, &published, None, None)?;
        self.write("index.html", &html)?;

        let mut report = GenerateReport::default();
        for article in &listed {
            let output = format!("articles/{}/index.html", article.slug);
            match resolver.resolve(&article.slug).await {
                Ok(resolved) => {
                    let html = self.pages.article_page(&resolved)?;
                    self.write(&output, &html)?;
                    report.articles += 1;
                }
                Err(e @ ResolveError::ContentMissing { .. }) => {
                    tracing::error!("{}", e);
                    let html = self.pages.broken_page(&article.slug)?;
                    self.write(&output, &html)?;
                    report.broken += 1;
                }
                // Listed from the same catalog; only a concurrent swap gets here
                Err(e) => tracing::warn!("Skipping `{}`: {}", article.slug, e),
            }
        }

        let html = self.pages.not_found_page(None)?;
        self.write("404.html", &html)?;

        self.generate_article_index(&published)?;

        tracing::info!(
            "Generated {} articles ({} broken)",
            report.articles,
            report.broken
        );
        Ok(report)
    }

    /// Slug list consumed by OG image tooling
    fn generate_article_index(&self, articles: &[ArticleMetadata]) -> Result<()> {
        let entries: Vec<ArticleEntry> = articles.iter().map(ArticleEntry::from).collect();
        let json = serde_json::to_string_pretty(&entries)?;
        self.write("articles.json", &json)?;
        tracing::debug!("Generated articles.json ({} entries)", entries.len());
        Ok(())
    }

    fn write(&self, relative: &str, contents: &str) -> Result<()> {
        let output_path = self.blog.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, contents)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Images and other files next to the articles, minus sources and components
    fn copy_article_assets(&self) -> Result<()> {
        let content_dir = &self.blog.content_dir;
        if !content_dir.is_dir() {
            return Ok(());
        }
        // Same site-relative prefix the scanner records as each article's asset dir
        let dest_root = self
            .blog
            .public_dir
            .join(self.blog.config.content_dir.trim_matches('/'));

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("md" | "mdx" | "yml" | "yaml")) {
                continue;
            }

            let rel = path.strip_prefix(content_dir)?;
            if rel.components().any(|c| c.as_os_str() == "components") {
                continue;
            }

            let dest = dest_root.join(rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }

    /// Copy a directory tree verbatim
    fn copy_dir(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.is_dir() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(from)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let dest = to.join(path.strip_prefix(from)?);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &dest)?;
                copied += 1;
            }
        }

        tracing::debug!("Copied {} files from {:?}", copied, from);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_article(root: &Path, slug: &str, published: bool, body: Option<&str>) {
        let dir = root.join("content/articles").join(slug);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("metadata.yml"),
            format!(
                "title: {slug}\nslug: {slug}\npublishDate: 2025-05-13\nsummary: s\npublished: {published}\n"
            ),
        )
        .unwrap();
        if let Some(body) = body {
            fs::write(dir.join("index.mdx"), body).unwrap();
        }
    }

    #[tokio::test]
    async fn test_generate_site() {
        let root = TempDir::new().unwrap();
        write_article(root.path(), "hello", true, Some("# Hello\n\n<Alert>hi</Alert>"));
        write_article(root.path(), "draft", false, Some("wip"));
        write_article(root.path(), "broken", true, None);
        fs::write(
            root.path().join("content/articles/hello/og.png"),
            b"png",
        )
        .unwrap();
        fs::create_dir_all(root.path().join("static/images")).unwrap();
        fs::write(root.path().join("static/images/logo.svg"), "<svg/>").unwrap();

        let blog = Blog::new(root.path()).unwrap();
        let resolver = blog.resolver().unwrap();
        let report = Generator::new(&blog)
            .unwrap()
            .generate(&resolver)
            .await
            .unwrap();

        assert_eq!(report, GenerateReport { articles: 1, broken: 1 });

        let public = root.path().join("public");
        let article = fs::read_to_string(public.join("articles/hello/index.html")).unwrap();
        assert!(article.contains(r#"<div class="alert alert-info" role="note">"#));
        assert!(!public.join("articles/draft").exists());
        assert!(public.join("404.html").exists());
        assert!(public.join("images/logo.svg").exists());
        assert!(public.join("content/articles/hello/og.png").exists());
        assert!(!public.join("content/articles/hello/index.mdx").exists());

        let json = fs::read_to_string(public.join("articles.json")).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(entries.as_array().unwrap().len(), 2);
        assert!(json.contains(r#""hasCustomOgImage": false"#));
    }

    #[tokio::test]
    async fn test_generate_drafts_when_enabled() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("_config.yml"), "render_drafts: true\n").unwrap();
        write_article(root.path(), "draft", false, Some("wip"));

        let blog = Blog::new(root.path()).unwrap();
        let resolver = blog.resolver().unwrap();
        Generator::new(&blog).unwrap().generate(&resolver).await.unwrap();

        assert!(root.path().join("public/articles/draft/index.html").exists());
        let index = fs::read_to_string(root.path().join("public/index.html")).unwrap();
        assert!(index.contains("No articles found."));
    }
}
