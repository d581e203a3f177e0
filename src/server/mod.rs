//! Blog server: renders articles on request from the live catalog

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    handler::Handler,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::CacheConfig;
use crate::content::CatalogHandle;
use crate::helpers::{filter_articles, og_image_url, url_for};
use crate::resolver::{NotFoundKind, Resolver};
use crate::templates::PageRenderer;
use crate::Blog;

/// Server state
pub struct ServerState {
    resolver: Resolver,
    pages: PageRenderer,
    cache: CacheConfig,
}

impl ServerState {
    pub fn new(resolver: Resolver, pages: PageRenderer) -> Self {
        let cache = pages.config().cache.clone();
        Self {
            resolver,
            pages,
            cache,
        }
    }
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool) -> Result<()> {
    let resolver = blog.resolver()?;
    let catalog = Arc::clone(resolver.catalog());
    let state = Arc::new(ServerState::new(resolver, blog.pages()?));

    let app = router(state, blog);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching {:?} for changes...", blog.content_dir);
        let blog = blog.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_rescan(&blog, &catalog) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes over `state`; static files and article assets come from `blog`'s directories
pub fn router(state: Arc<ServerState>, blog: &Blog) -> Router {
    let not_found = ServeDir::new(&blog.static_dir)
        .not_found_service(not_found_handler.with_state(Arc::clone(&state)));

    let mut app = Router::new()
        .route("/", get(index_handler))
        .route("/articles/:slug", get(article_handler))
        .route("/articles/:slug/", get(article_handler))
        .route("/api/articles", get(api_articles_handler))
        .route("/og-image/:slug", get(og_image_handler));

    let assets = blog.config.content_dir.trim_matches('/');
    if !assets.is_empty() {
        app = app.nest_service(&format!("/{}", assets), ServeDir::new(&blog.content_dir));
    }

    app.fallback_service(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    tag: Option<String>,
    q: Option<String>,
}

async fn index_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let all = state.resolver.list_published();
    let shown = filter_articles(&all, query.tag.as_deref(), query.q.as_deref());
    render(state.pages.index_page(
        &all,
        &shown,
        query.tag.as_deref(),
        query.q.as_deref(),
    ))
}

async fn article_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.resolver.resolve(&slug).await {
        Ok(article) => {
            let mut response = render(state.pages.article_page(&article));
            if response.status().is_success() {
                set_max_age(&mut response, state.cache.article_max_age);
            }
            response
        }
        Err(e) => match e.kind() {
            NotFoundKind::MetadataMissing => {
                tracing::debug!("{}", e);
                let mut response = render(state.pages.not_found_page(Some(&slug)));
                *response.status_mut() = StatusCode::NOT_FOUND;
                response
            }
            NotFoundKind::ContentMissing => {
                let mut response = render(state.pages.broken_page(&slug));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        },
    }
}

async fn api_articles_handler(State(state): State<Arc<ServerState>>) -> Response {
    Json(state.resolver.list_published()).into_response()
}

/// Redirect to the article's OG image, or the site default for unknown slugs
async fn og_image_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let config = state.pages.config();
    let catalog = state.resolver.catalog().snapshot();
    let target = match catalog.metadata().get(&slug) {
        Some(article) => og_image_url(config, article, catalog.asset_dir(&slug)),
        None => url_for(config, &config.default_og_image),
    };

    let mut response = Redirect::temporary(&target).into_response();
    set_max_age(&mut response, state.cache.og_image_max_age);
    response
}

async fn not_found_handler(State(state): State<Arc<ServerState>>) -> Response {
    let mut response = render(state.pages.not_found_page(None));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

fn render(page: Result<String>) -> Response {
    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

fn set_max_age(response: &mut Response, max_age: u32) {
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", max_age)) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
}

/// Re-scan the content directory on change and swap the catalog.
///
/// Blocks; run it on a blocking thread. A failed scan keeps the current catalog.
fn watch_and_rescan(blog: &Blog, catalog: &CatalogHandle) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rescans
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if blog.content_dir.exists() {
        debouncer
            .watcher()
            .watch(&blog.content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", blog.content_dir);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| {
                    let path_str = e.path.to_string_lossy();
                    !path_str.contains(".git")
                        && !path_str.contains(".DS_Store")
                        && !path_str.ends_with('~')
                });
                if !relevant {
                    continue;
                }

                for event in &events {
                    tracing::debug!("Changed: {}", event.path.display());
                }
                rescan(blog, catalog);
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Publish a fresh scan; on failure the old catalog stays live
fn rescan(blog: &Blog, catalog: &CatalogHandle) -> bool {
    match blog.scan() {
        Ok(fresh) => {
            catalog.replace(fresh);
            true
        }
        Err(e) => {
            tracing::error!("Rescan failed, keeping the current catalog: {:#}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_article(root: &std::path::Path, dir: &str, slug: &str, extra: &str, body: Option<&str>) {
        let dir = root.join("content/articles").join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("metadata.yml"),
            format!(
                "title: {slug}\nslug: {slug}\npublishDate: 2025-05-13\nsummary: about {slug}\npublished: true\n{extra}"
            ),
        )
        .unwrap();
        if let Some(body) = body {
            fs::write(dir.join("index.mdx"), body).unwrap();
        }
    }

    fn site() -> (TempDir, Blog, Arc<ServerState>) {
        let root = TempDir::new().unwrap();
        write_article(root.path(), "hello", "hello", "tags: [rust]\nogImage: og.png\n", Some("# Hello"));
        write_article(root.path(), "other", "other", "", Some("text"));
        write_article(root.path(), "broken", "broken", "", None);

        let blog = Blog::new(root.path()).unwrap();
        let state = Arc::new(ServerState::new(
            blog.resolver().unwrap(),
            blog.pages().unwrap(),
        ));
        (root, blog, state)
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_article_found() {
        let (_root, _blog, state) = site();
        let response = article_handler(State(state), Path("hello".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600"
        );
        assert!(body(response).await.contains("<h1>Hello</h1>"));
    }

    #[tokio::test]
    async fn test_article_not_found_and_broken() {
        let (_root, _blog, state) = site();

        let response = article_handler(State(Arc::clone(&state)), Path("nope".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());

        let response = article_handler(State(state), Path("broken".to_string())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body(response).await.contains("content is missing"));
    }

    #[tokio::test]
    async fn test_index_filters() {
        let (_root, _blog, state) = site();
        let query = ListQuery {
            tag: Some("rust".to_string()),
            q: None,
        };
        let html = body(index_handler(State(state), Query(query)).await).await;
        assert!(html.contains(r#"href="/articles/hello/""#));
        assert!(!html.contains(r#"href="/articles/other/""#));
    }

    #[tokio::test]
    async fn test_api_articles() {
        let (_root, _blog, state) = site();
        let json = body(api_articles_handler(State(state)).await).await;
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
        assert!(json.contains(r#""publishDate":"2025-05-13""#));
    }

    #[tokio::test]
    async fn test_og_image_redirects() {
        let (_root, _blog, state) = site();

        let response = og_image_handler(State(Arc::clone(&state)), Path("hello".to_string())).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/content/articles/hello/og.png"
        );
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=86400"
        );

        let response = og_image_handler(State(state), Path("nope".to_string())).await;
        assert_eq!(
            response.headers()[header::LOCATION],
            "/images/og-default.png"
        );
    }

    #[tokio::test]
    async fn test_og_image_follows_article_directory() {
        let root = TempDir::new().unwrap();
        write_article(root.path(), "2025-my-post", "my-post", "ogImage: og.png\n", Some("x"));
        fs::write(root.path().join("content/articles/2025-my-post/og.png"), b"png").unwrap();

        let blog = Blog::new(root.path()).unwrap();
        let state = Arc::new(ServerState::new(
            blog.resolver().unwrap(),
            blog.pages().unwrap(),
        ));

        let response = og_image_handler(State(Arc::clone(&state)), Path("my-post".to_string())).await;
        assert_eq!(
            response.headers()[header::LOCATION],
            "/content/articles/2025-my-post/og.png"
        );

        let html = body(article_handler(State(state), Path("my-post".to_string())).await).await;
        assert!(html.contains("/content/articles/2025-my-post/og.png"));
    }

    #[tokio::test]
    async fn test_assets_mounted_from_configured_dir() {
        use tower::ServiceExt;

        let root = TempDir::new().unwrap();
        fs::write(root.path().join("_config.yml"), "content_dir: posts\n").unwrap();
        let dir = root.path().join("posts/2025-my-post");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("metadata.yml"),
            "title: t\nslug: my-post\npublishDate: 2025-05-13\nsummary: s\npublished: true\nogImage: og.png\n",
        )
        .unwrap();
        fs::write(dir.join("index.mdx"), "x").unwrap();
        fs::write(dir.join("og.png"), b"png").unwrap();

        let blog = Blog::new(root.path()).unwrap();
        let state = Arc::new(ServerState::new(
            blog.resolver().unwrap(),
            blog.pages().unwrap(),
        ));

        let response = og_image_handler(State(Arc::clone(&state)), Path("my-post".to_string())).await;
        assert_eq!(response.headers()[header::LOCATION], "/posts/2025-my-post/og.png");

        let request = axum::http::Request::builder()
            .uri("/posts/2025-my-post/og.png")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router(state, &blog).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, "png");
    }

    #[tokio::test]
    async fn test_rescan_swaps_catalog() {
        let (root, blog, state) = site();
        let catalog = state.resolver.catalog();

        write_article(root.path(), "fresh", "fresh", "", Some("new"));
        assert!(rescan(&blog, catalog));
        assert!(state.resolver.resolve("fresh").await.is_ok());

        // A duplicate slug fails the scan; the previous catalog stays live
        write_article(root.path(), "zz-dup", "fresh", "", Some("dup"));
        assert!(!rescan(&blog, catalog));
        let article = state.resolver.resolve("fresh").await.unwrap();
        assert_eq!(article.content.source(), "new");
    }
}
