//! Resolve one article and print it

use anyhow::Result;

use crate::resolver::{NotFoundKind, ResolvedArticle};
use crate::Blog;

/// Print the metadata summary, or the rendered HTML with `html`
pub async fn run(blog: &Blog, slug: &str, html: bool) -> Result<()> {
    let resolver = blog.resolver()?;

    let article = match resolver.resolve(slug).await {
        Ok(article) => article,
        Err(e) => match e.kind() {
            NotFoundKind::MetadataMissing => anyhow::bail!("Article not found: {}", slug),
            NotFoundKind::ContentMissing => {
                return Err(anyhow::Error::new(e).context(format!(
                    "Article `{}` is listed but its index.mdx is missing",
                    slug
                )))
            }
        },
    };

    if html {
        println!("{}", article.render(&blog.markdown()));
    } else {
        print!("{}", summary(&article));
    }

    Ok(())
}

fn summary(article: &ResolvedArticle) -> String {
    let meta = &article.metadata;
    let mut out = String::new();
    out.push_str(&format!("Title:      {}\n", meta.title));
    out.push_str(&format!("Slug:       {}\n", meta.slug));
    out.push_str(&format!("Published:  {}\n", meta.published));
    out.push_str(&format!("Date:       {}\n", meta.publish_date.format("%Y-%m-%d")));
    if !meta.tags.is_empty() {
        out.push_str(&format!("Tags:       {}\n", meta.tags.join(", ")));
    }
    out.push_str(&format!(
        "Components: {}\n",
        article.components.names().collect::<Vec<_>>().join(", ")
    ));

    let used = article.content.document().component_names();
    let missing: Vec<_> = used
        .iter()
        .filter(|name| !article.components.contains(name))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        out.push_str(&format!("Missing:    {}\n", missing.join(", ")));
    }
    out
}
