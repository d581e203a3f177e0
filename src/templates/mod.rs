//! Page templates using the Tera template engine
//!
//! The templates are embedded in the binary; the site only provides content,
//! components and static files.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{ArticleMetadata, MarkdownRenderer};
use crate::helpers::{all_tags, article_path, og_image_url, open_graph, url_for};
use crate::resolver::ResolvedArticle;

/// Template renderer with the embedded pages
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rendered article HTML and meta tags are inserted as-is; text is
        // escaped in the templates with `| escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("pages/layout.html")),
            ("index.html", include_str!("pages/index.html")),
            ("article.html", include_str!("pages/article.html")),
            ("not_found.html", include_str!("pages/not_found.html")),
            ("broken.html", include_str!("pages/broken.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(crate::helpers::truncate(
        &s,
        length,
        Some(&omission),
    )))
}

/// Tera filter: format a `YYYY-MM-DD` date
///
/// `format="LL"` gives `May 14, 2025`; any other format is a chrono
/// strftime string.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%Y-%m-%d".to_string(),
    };
    let format = if format == "LL" { "%B %-d, %Y" } else { &format };

    match chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        Ok(date) => Ok(tera::Value::String(date.format(format).to_string())),
        // Not a date; leave as-is
        Err(_) => Ok(tera::Value::String(s)),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: url_for(config, "/"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub title: String,
    pub slug: String,
    pub path: String,
    pub permalink: String,
    pub date: String,
    pub last_updated: Option<String>,
    pub summary: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
}

impl ArticleData {
    pub fn new(config: &SiteConfig, article: &ArticleMetadata) -> Self {
        let path = article_path(config, &article.slug);
        Self {
            title: article.title.clone(),
            slug: article.slug.clone(),
            permalink: config.permalink(&path),
            path,
            date: article.publish_date.format("%Y-%m-%d").to_string(),
            last_updated: article
                .last_updated
                .map(|d| d.format("%Y-%m-%d").to_string()),
            summary: article.summary.clone(),
            tags: article.tags.clone(),
            cover_image: article.cover_image.clone(),
            author_name: article.author.as_ref().map(|a| a.name.clone()),
            author_avatar: article.author.as_ref().and_then(|a| a.avatar.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagData {
    pub name: String,
    pub count: usize,
}

/// Renders full pages for the generator and the server
pub struct PageRenderer {
    config: SiteConfig,
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl PageRenderer {
    pub fn new(config: SiteConfig, markdown: MarkdownRenderer) -> Result<Self> {
        Ok(Self {
            config,
            templates: TemplateRenderer::new()?,
            markdown,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&self.config));
        context
    }

    /// Listing page. Tags are counted over `all`, the unfiltered listing.
    pub fn index_page(
        &self,
        all: &[ArticleMetadata],
        shown: &[ArticleMetadata],
        tag: Option<&str>,
        query: Option<&str>,
    ) -> Result<String> {
        let tags: Vec<TagData> = all_tags(all)
            .into_iter()
            .map(|(name, count)| TagData { name, count })
            .collect();
        let articles: Vec<ArticleData> = shown
            .iter()
            .map(|a| ArticleData::new(&self.config, a))
            .collect();

        let mut context = self.context();
        context.insert("articles", &articles);
        context.insert("tags", &tags);
        context.insert("tag", &tag);
        context.insert("query", &query);
        self.templates.render("index.html", &context)
    }

    pub fn article_page(&self, article: &ResolvedArticle) -> Result<String> {
        let data = ArticleData::new(&self.config, &article.metadata);
        let content = article.render(&self.markdown);
        let og_image = og_image_url(&self.config, &article.metadata, article.asset_dir.as_deref());
        let meta = open_graph(
            &data.title,
            &data.summary,
            &data.permalink,
            &self.config.permalink(&og_image),
            &self.config.title,
        );

        let mut context = self.context();
        context.insert("article", &data);
        context.insert("content", &content);
        context.insert("open_graph", &meta);
        self.templates.render("article.html", &context)
    }

    pub fn not_found_page(&self, slug: Option<&str>) -> Result<String> {
        let mut context = self.context();
        context.insert("slug", &slug);
        self.templates.render("not_found.html", &context)
    }

    pub fn broken_page(&self, slug: &str) -> Result<String> {
        let mut context = self.context();
        context.insert("slug", slug);
        self.templates.render("broken.html", &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ComponentSet, Registry};
    use crate::content::testing::article;
    use crate::content::{Author, ContentBody};

    fn pages() -> PageRenderer {
        let config = SiteConfig {
            title: "Test Blog".to_string(),
            url: "https://blog.example.com".to_string(),
            ..SiteConfig::default()
        };
        PageRenderer::new(config, MarkdownRenderer::new()).unwrap()
    }

    #[test]
    fn test_templates_load() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_index_page_lists_articles() {
        let mut first = article("first-post", "2025-05-14", true);
        first.tags = vec!["rust".to_string()];
        let all = vec![first, article("second", "2025-05-11", true)];

        let html = pages().index_page(&all, &all[..1], Some("rust"), None).unwrap();
        assert!(html.contains(r#"href="/articles/first-post/""#));
        assert!(html.contains("Title of first-post"));
        assert!(!html.contains("Title of second"));
        assert!(html.contains("May 14, 2025"));
        assert!(html.contains("#rust (1)"));
    }

    #[test]
    fn test_index_page_empty() {
        let html = pages().index_page(&[], &[], None, Some("zzz")).unwrap();
        assert!(html.contains("No articles found."));
        assert!(html.contains(r#"value="zzz""#));
    }

    #[test]
    fn test_article_page_meta() {
        let mut metadata = article("first-post", "2025-05-13", true);
        metadata.og_image = Some("og.png".to_string());
        metadata.author = Some(Author {
            name: "Ada".to_string(),
            avatar: None,
        });
        let resolved = ResolvedArticle {
            metadata,
            content: ContentBody::parse("first-post", "# Hello <World>"),
            components: Registry::build(&ComponentSet::new(), &ComponentSet::new()),
            asset_dir: None,
        };

        let html = pages().article_page(&resolved).unwrap();
        assert!(html.contains("<title>Title of first-post | Test Blog</title>"));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
        assert!(html.contains(
            r#"content="https://blog.example.com/content/articles/first-post/og.png""#
        ));
        assert!(html.contains("Ada"));
        assert!(html.contains(r#"Component "World" not found"#));
    }

    #[test]
    fn test_article_page_og_image_from_asset_dir() {
        let mut metadata = article("my-post", "2025-05-13", true);
        metadata.og_image = Some("og.png".to_string());
        let resolved = ResolvedArticle {
            metadata,
            content: ContentBody::parse("my-post", "text"),
            components: Registry::build(&ComponentSet::new(), &ComponentSet::new()),
            asset_dir: Some("content/articles/2025-my-post".to_string()),
        };

        let html = pages().article_page(&resolved).unwrap();
        assert!(html.contains(
            r#"content="https://blog.example.com/content/articles/2025-my-post/og.png""#
        ));
    }

    #[test]
    fn test_article_page_escapes_image_sources() {
        let mut metadata = article("first-post", "2025-05-13", true);
        metadata.cover_image = Some(r#"x" onerror="alert(1)"#.to_string());
        metadata.author = Some(Author {
            name: "Ada".to_string(),
            avatar: Some(r#"a.png" onload="alert(2)"#.to_string()),
        });
        let resolved = ResolvedArticle {
            metadata,
            content: ContentBody::parse("first-post", "text"),
            components: Registry::build(&ComponentSet::new(), &ComponentSet::new()),
            asset_dir: None,
        };

        let html = pages().article_page(&resolved).unwrap();
        assert!(!html.contains(r#"onerror="alert(1)""#));
        assert!(!html.contains(r#"onload="alert(2)""#));
        assert!(html.contains(r#"src="x&quot; onerror=&quot;alert(1)""#));
        assert!(html.contains(r#"src="a.png&quot; onload=&quot;alert(2)""#));
    }

    #[test]
    fn test_error_pages() {
        let pages = pages();
        let html = pages.not_found_page(Some("<nope>")).unwrap();
        assert!(html.contains("&lt;nope&gt;"));
        let html = pages.broken_page("broken").unwrap();
        assert!(html.contains("content is missing"));
    }

    #[test]
    fn test_date_format_filter() {
        let mut args = HashMap::new();
        args.insert("format".to_string(), tera::Value::String("LL".to_string()));
        let value = date_format_filter(&tera::Value::String("2025-05-04".to_string()), &args)
            .unwrap();
        assert_eq!(value, tera::Value::String("May 4, 2025".to_string()));
    }
}
