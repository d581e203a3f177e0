//! Generate static files

use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Scan, resolve and render the whole site
pub async fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let resolver = blog.resolver()?;
    let generator = Generator::new(blog)?;
    let GenerateReport { articles, broken } = generator.generate(&resolver).await?;

    if broken > 0 {
        tracing::warn!("{} listed articles have no content body", broken);
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} articles in {:.2}s",
        articles,
        duration.as_secs_f64()
    );

    Ok(())
}

/// Watch content, components, static files and config; regenerate on change
pub async fn watch(blog: &Blog) -> Result<()> {
    let (_debouncer, mut rx) = debounced_changes(blog, DEBOUNCE)?;

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while let Some(mut paths) = rx.recv().await {
        // Changes that queued up during the last build go into this one
        while let Ok(more) = rx.try_recv() {
            paths.extend(more);
        }
        for path in &paths {
            tracing::debug!("Changed: {}", path.display());
        }

        tracing::info!("File changed, regenerating...");
        // Config may have changed too
        let result = match Blog::new(&blog.base_dir) {
            Ok(fresh) => run(&fresh).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::error!("Generation failed: {:#}", e);
        }
    }

    Ok(())
}

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Batches of changed paths, each sent once `timeout` has passed without
/// further events. Dropping the debouncer stops the watch.
fn debounced_changes(
    blog: &Blog,
    timeout: Duration,
) -> Result<(Debouncer<RecommendedWatcher>, mpsc::UnboundedReceiver<Vec<PathBuf>>)> {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut debouncer = new_debouncer(timeout, move |res: DebounceEventResult| match res {
        Ok(events) => {
            let paths: Vec<PathBuf> = events
                .into_iter()
                .map(|e| e.path)
                .filter(|p| is_relevant(p))
                .collect();
            if !paths.is_empty() {
                let _ = tx.send(paths);
            }
        }
        Err(e) => tracing::error!("Watch error: {:?}", e),
    })?;

    for dir in [&blog.content_dir, &blog.components_dir, &blog.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = blog.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    Ok((debouncer, rx))
}

fn is_relevant(path: &Path) -> bool {
    let path = path.to_string_lossy();
    !path.contains(".git") && !path.contains(".DS_Store") && !path.ends_with('~')
}
