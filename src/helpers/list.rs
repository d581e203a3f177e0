//! List helper functions for article listings

use indexmap::IndexMap;

use crate::content::ArticleMetadata;

/// Narrow a listing by tag and free-text query.
///
/// The tag must match exactly; the query is a case-insensitive substring of
/// the title or summary. Order is preserved.
pub fn filter_articles(
    articles: &[ArticleMetadata],
    tag: Option<&str>,
    query: Option<&str>,
) -> Vec<ArticleMetadata> {
    let query = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    articles
        .iter()
        .filter(|a| tag.map_or(true, |t| a.has_tag(t)))
        .filter(|a| match &query {
            Some(q) => {
                a.title.to_lowercase().contains(q) || a.summary.to_lowercase().contains(q)
            }
            None => true,
        })
        .cloned()
        .collect()
}

/// Tag counts in first-seen order
pub fn all_tags(articles: &[ArticleMetadata]) -> IndexMap<String, usize> {
    let mut tags = IndexMap::new();
    for article in articles {
        for tag in &article.tags {
            *tags.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::article;

    fn sample() -> Vec<ArticleMetadata> {
        let mut rust = article("rust-tips", "2025-05-14", true);
        rust.title = "Rust Tips".to_string();
        rust.tags = vec!["rust".to_string(), "tips".to_string()];
        let mut mdx = article("mdx-blog-setup", "2025-05-11", true);
        mdx.summary = "Setting up MDX with custom components".to_string();
        mdx.tags = vec!["mdx".to_string(), "tips".to_string()];
        vec![rust, mdx]
    }

    #[test]
    fn test_filter_by_tag() {
        let articles = sample();
        let slugs: Vec<_> = filter_articles(&articles, Some("tips"), None)
            .into_iter()
            .map(|a| a.slug)
            .collect();
        assert_eq!(slugs, vec!["rust-tips", "mdx-blog-setup"]);
        assert_eq!(filter_articles(&articles, Some("rust"), None).len(), 1);
        assert!(filter_articles(&articles, Some("go"), None).is_empty());
    }

    #[test]
    fn test_filter_by_query() {
        let articles = sample();
        let found = filter_articles(&articles, None, Some("rust"));
        assert_eq!(found[0].slug, "rust-tips");
        let found = filter_articles(&articles, None, Some("CUSTOM components"));
        assert_eq!(found[0].slug, "mdx-blog-setup");
        assert_eq!(filter_articles(&articles, None, Some("  ")).len(), 2);
    }

    #[test]
    fn test_all_tags() {
        let tags = all_tags(&sample());
        assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["rust", "tips", "mdx"]);
        assert_eq!(tags["tips"], 2);
    }
}
