//! List articles

use anyhow::Result;

use crate::content::ArticleMetadata;
use crate::Blog;

/// Print published articles, newest first; drafts too when asked
pub fn run(blog: &Blog, drafts: bool) -> Result<()> {
    let resolver = blog.resolver()?;
    let articles = if drafts {
        resolver.list_all()
    } else {
        resolver.list_published()
    };

    println!("Articles ({}):", articles.len());
    for line in format_listing(&articles) {
        println!("  {}", line);
    }

    Ok(())
}

fn format_listing(articles: &[ArticleMetadata]) -> Vec<String> {
    articles
        .iter()
        .map(|a| {
            let draft = if a.published { "" } else { " (draft)" };
            format!(
                "{} - {} [{}]{}",
                a.publish_date.format("%Y-%m-%d"),
                a.title,
                a.slug,
                draft
            )
        })
        .collect()
}
