//! Built-in global components

use std::sync::Arc;

use super::{Component, ComponentSet, Props};
use crate::helpers::html_escape;

/// The global set every article gets unless the site overrides a name
pub fn builtin_components() -> ComponentSet {
    ComponentSet::new()
        .with("Alert", Arc::new(Alert))
        .with("CodeBlock", Arc::new(CodeBlock))
        .with("YouTube", Arc::new(YouTube))
        .with("Tweet", Arc::new(Tweet))
        .with("Details", Arc::new(Details))
}

/// Callout box: `<Alert type="warning">...</Alert>`
#[derive(Debug)]
pub struct Alert;

impl Component for Alert {
    fn render(&self, props: &Props, children: &str) -> String {
        let kind = match props.get("type").map(String::as_str) {
            Some(k @ ("warning" | "error" | "success")) => k,
            _ => "info",
        };
        format!(
            r#"<div class="alert alert-{}" role="note">{}</div>"#,
            kind, children
        )
    }
}

/// Code panel with a language header.
///
/// Accepts `className="language-rust"` as emitted by MDX, or `language="rust"`.
#[derive(Debug)]
pub struct CodeBlock;

impl Component for CodeBlock {
    fn render(&self, props: &Props, children: &str) -> String {
        let language = props
            .get("language")
            .map(String::as_str)
            .or_else(|| {
                props
                    .get("className")
                    .map(|c| c.trim_start_matches("language-"))
            })
            .filter(|l| !l.is_empty());

        let class_attr = language
            .map(|l| format!(r#" class="language-{}""#, html_escape(l)))
            .unwrap_or_default();

        format!(
            r#"<div class="code-block"><div class="code-block-header">{}</div><pre><code{}>{}</code></pre></div>"#,
            html_escape(language.unwrap_or("code")),
            class_attr,
            children
        )
    }
}

/// Responsive YouTube embed: `<YouTube id="..." title="..." />`
#[derive(Debug)]
pub struct YouTube;

impl Component for YouTube {
    fn render(&self, props: &Props, _children: &str) -> String {
        let Some(id) = props.get("id").filter(|id| !id.is_empty()) else {
            return r#"<div class="youtube-embed youtube-embed-missing">YouTube video id missing</div>"#
                .to_string();
        };
        let title = props
            .get("title")
            .map(String::as_str)
            .unwrap_or("YouTube video");

        format!(
            r#"<div class="youtube-embed"><iframe src="https://www.youtube.com/embed/{}" title="{}" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe></div>"#,
            html_escape(id),
            html_escape(title)
        )
    }
}

/// Tweet embed. The blockquote upgrades itself when Twitter's widget script
/// is present and stays a plain link otherwise.
#[derive(Debug)]
pub struct Tweet;

impl Component for Tweet {
    fn render(&self, props: &Props, _children: &str) -> String {
        let id = props.get("id").map(String::as_str).unwrap_or_default();
        let id = html_escape(id);
        format!(
            r#"<div class="tweet-container"><blockquote class="twitter-tweet" data-dnt="true" data-conversation="none"><a href="https://twitter.com/twitter/status/{id}" target="_blank" rel="noopener noreferrer">View Tweet {id}</a></blockquote><script async src="https://platform.twitter.com/widgets.js"></script></div>"#
        )
    }
}

/// Collapsible section: `<Details summary="Show more">...</Details>`
#[derive(Debug)]
pub struct Details;

impl Component for Details {
    fn render(&self, props: &Props, children: &str) -> String {
        let summary = props
            .get("summary")
            .map(String::as_str)
            .unwrap_or("Details");
        format!(
            "<details><summary>{}</summary>{}</details>",
            html_escape(summary),
            children
        )
    }
}
