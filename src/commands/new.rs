//! Scaffold a new article

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::{is_valid_slug, ArticleMetadata};
use crate::Blog;

/// Create `<content_dir>/<slug>/{metadata.yml,index.mdx}`; returns the directory
pub fn create_article(blog: &Blog, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => s.to_string(),
        None => slug::slugify(title),
    };
    if !is_valid_slug(&slug) {
        anyhow::bail!("Cannot derive a slug from {:?}; pass --slug", title);
    }

    let dir = blog.content_dir.join(&slug);
    if dir.exists() {
        anyhow::bail!("Article directory already exists: {:?}", dir);
    }

    let metadata = ArticleMetadata {
        title: title.to_string(),
        slug: slug.clone(),
        publish_date: chrono::Local::now().date_naive(),
        last_updated: None,
        summary: String::new(),
        tags: Vec::new(),
        published: false,
        cover_image: None,
        og_image: None,
        author: None,
    };

    fs::create_dir_all(&dir)?;
    fs::write(dir.join("metadata.yml"), serde_yaml::to_string(&metadata)?)?;
    fs::write(dir.join("index.mdx"), format!("# {}\n\n", title))?;

    tracing::info!("Created article `{}` in {:?}", slug, dir);
    Ok(dir)
}

/// Run the new command
pub fn run(blog: &Blog, title: &str, slug: Option<&str>) -> Result<()> {
    let dir = create_article(blog, title, slug)?;
    println!("Created: {:?}", dir);
    Ok(())
}
