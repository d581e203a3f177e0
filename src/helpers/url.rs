//! URL helper functions

use crate::config::SiteConfig;
use crate::content::ArticleMetadata;

/// Generate a URL relative to the site root
///
/// # Examples
/// ```ignore
/// url_for(&config, "articles/first-post/") // -> /blog/articles/first-post/
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        return path.to_string();
    }

    let root = if config.root.ends_with('/') {
        config.root.clone()
    } else {
        format!("{}/", config.root)
    };

    format!("{}{}", root, path.trim_start_matches('/'))
}

/// Site-relative path of an article page
pub fn article_path(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("articles/{}/", slug))
}

/// OG image for an article: its own `ogImage` when set, the site default otherwise.
///
/// `asset_dir` is the site-relative directory the article's files are served
/// from; without one the image is looked up under `content_dir/<slug>`.
pub fn og_image_url(config: &SiteConfig, article: &ArticleMetadata, asset_dir: Option<&str>) -> String {
    let Some(image) = &article.og_image else {
        return url_for(config, &config.default_og_image);
    };

    let dir = match asset_dir {
        Some(dir) => dir.trim_matches('/').to_string(),
        None => format!("{}/{}", config.content_dir.trim_matches('/'), article.slug),
    };
    url_for(config, &format!("{}/{}", dir, image.trim_start_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::article;

    #[test]
    fn test_url_for() {
        let mut config = SiteConfig::default();
        config.root = "/blog".to_string();
        assert_eq!(url_for(&config, "/about/"), "/blog/about/");
        assert_eq!(
            url_for(&config, "https://example.com/x"),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_og_image_url() {
        let config = SiteConfig::default();
        let mut meta = article("first-post", "2025-05-13", true);

        assert_eq!(og_image_url(&config, &meta, None), "/images/og-default.png");

        meta.og_image = Some("og.png".to_string());
        assert_eq!(
            og_image_url(&config, &meta, None),
            "/content/articles/first-post/og.png"
        );
    }

    #[test]
    fn test_og_image_url_uses_asset_dir() {
        let mut config = SiteConfig::default();
        config.content_dir = "posts".to_string();
        let mut meta = article("my-post", "2025-05-13", true);
        meta.og_image = Some("/og.png".to_string());

        assert_eq!(
            og_image_url(&config, &meta, Some("posts/2025-my-post")),
            "/posts/2025-my-post/og.png"
        );
        assert_eq!(og_image_url(&config, &meta, None), "/posts/my-post/og.png");
    }
}
