//! MDX-style documents: Markdown with embedded component tags
//!
//! ```text
//! Some **markdown**.
//!
//! <Alert type="warning">
//! Components can wrap markdown.
//! </Alert>
//!
//! <YouTube id="dQw4w9WgXcQ" />
//! ```
//!
//! Tags whose name starts with an uppercase letter are component
//! invocations; everything else is left to the Markdown renderer. Parsing is
//! lenient and never fails: a stray closing tag stays literal text, and an
//! unclosed opening tag runs to the end of the document.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;

use super::MarkdownRenderer;
use crate::components::{Props, Registry};
use crate::helpers::html_escape;

lazy_static! {
    static ref TAG: Regex = Regex::new(
        r#"<(/?)([A-Z][A-Za-z0-9_]*)((?:\s+[A-Za-z_][\w:.-]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{[^{}]*\}))?)*)\s*(/?)>"#
    )
    .expect("valid tag regex");
    static ref ATTR: Regex = Regex::new(
        r#"([A-Za-z_][\w:.-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^{}]*)\}))?"#
    )
    .expect("valid attribute regex");
    static ref INLINE_CODE: Regex = Regex::new(r"``[^\n]*?``|`[^`\n]*`").expect("valid code regex");
}

/// A parsed document node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Markdown(String),
    Component {
        name: String,
        props: Props,
        children: Vec<Node>,
    },
}

/// A parsed content body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

struct Frame {
    name: String,
    props: Props,
    children: Vec<Node>,
}

impl Frame {
    fn into_node(self) -> Node {
        Node::Component {
            name: self.name,
            props: self.props,
            children: self.children,
        }
    }
}

impl Document {
    /// Parse MDX-style source
    pub fn parse(source: &str) -> Self {
        let protected = code_ranges(source);
        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut text_start = 0;

        for caps in TAG.captures_iter(source) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            if protected.iter().any(|r| r.contains(&whole.start)) {
                continue;
            }

            let name = &caps[2];
            let closing = &caps[1] == "/";

            if closing {
                let Some(pos) = stack.iter().rposition(|f| f.name == name) else {
                    tracing::debug!("Stray closing tag </{}> kept as text", name);
                    continue;
                };
                push_text(
                    current(&mut stack, &mut root),
                    &source[text_start..whole.start],
                );
                // Anything opened after the matching tag is closed with it
                while stack.len() > pos {
                    if let Some(frame) = stack.pop() {
                        current(&mut stack, &mut root).push(frame.into_node());
                    }
                }
            } else {
                push_text(
                    current(&mut stack, &mut root),
                    &source[text_start..whole.start],
                );
                let props = parse_props(&caps[3]);
                let frame = Frame {
                    name: name.to_string(),
                    props,
                    children: Vec::new(),
                };
                if &caps[4] == "/" {
                    current(&mut stack, &mut root).push(frame.into_node());
                } else {
                    stack.push(frame);
                }
            }
            text_start = whole.end;
        }

        push_text(current(&mut stack, &mut root), &source[text_start..]);
        while let Some(frame) = stack.pop() {
            tracing::debug!("Unclosed tag <{}> runs to the end of the document", frame.name);
            current(&mut stack, &mut root).push(frame.into_node());
        }

        prune_blank(&mut root);
        Self { nodes: root }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Names of every component the document invokes
    pub fn component_names(&self) -> BTreeSet<String> {
        fn walk(nodes: &[Node], names: &mut BTreeSet<String>) {
            for node in nodes {
                if let Node::Component { name, children, .. } = node {
                    names.insert(name.clone());
                    walk(children, names);
                }
            }
        }

        let mut names = BTreeSet::new();
        walk(&self.nodes, &mut names);
        names
    }

    /// Render to HTML, resolving component names through `registry`
    pub fn render(&self, registry: &Registry, markdown: &MarkdownRenderer) -> String {
        render_nodes(&self.nodes, registry, markdown)
    }
}

/// Render one sibling list as a single Markdown pass.
///
/// Components are swapped for placeholder tokens first, so text around an
/// inline component stays in one paragraph. A token that ends up alone in
/// a paragraph is a block component and replaces the whole `<p>`.
fn render_nodes(nodes: &[Node], registry: &Registry, markdown: &MarkdownRenderer) -> String {
    let mut text = String::new();
    let mut rendered = Vec::new();
    for node in nodes {
        match node {
            Node::Markdown(segment) => text.push_str(segment),
            Node::Component {
                name,
                props,
                children,
            } => {
                let children_html = render_nodes(children, registry, markdown);
                text.push_str(&placeholder(rendered.len()));
                rendered.push(registry.get(name).render(props, &children_html));
            }
        }
    }

    let mut out = match markdown.render(&text) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Failed to render markdown: {}", e);
            format!("<pre>{}</pre>", html_escape(&text))
        }
    };

    for (i, html) in rendered.iter().enumerate() {
        let token = placeholder(i);
        let block = format!("<p>{}</p>", token);
        if out.contains(&block) {
            out = out.replacen(&block, html, 1);
        } else {
            out = out.replacen(&token, html, 1);
        }
    }
    out
}

fn placeholder(index: usize) -> String {
    format!("\u{E000}{}\u{E001}", index)
}

fn current<'a>(stack: &'a mut [Frame], root: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    match nodes.last_mut() {
        Some(Node::Markdown(prev)) => prev.push_str(text),
        _ => nodes.push(Node::Markdown(text.to_string())),
    }
}

/// Drop blank text unless it separates two components
fn prune_blank(nodes: &mut Vec<Node>) {
    let is_component = |node: Option<&Node>| matches!(node, Some(Node::Component { .. }));

    let mut keep = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        keep.push(match node {
            Node::Markdown(text) if text.trim().is_empty() => {
                i > 0 && is_component(nodes.get(i - 1)) && is_component(nodes.get(i + 1))
            }
            _ => true,
        });
    }
    let mut flags = keep.into_iter();
    nodes.retain(|_| flags.next().unwrap_or(true));

    for node in nodes.iter_mut() {
        if let Node::Component { children, .. } = node {
            prune_blank(children);
        }
    }
}

fn parse_props(attrs: &str) -> Props {
    let mut props = Props::new();
    for caps in ATTR.captures_iter(attrs) {
        let key = caps[1].to_string();
        let value = if let Some(v) = caps.get(2).or_else(|| caps.get(3)) {
            v.as_str().to_string()
        } else if let Some(expr) = caps.get(4) {
            unquote(expr.as_str().trim()).to_string()
        } else {
            "true".to_string()
        };
        props.insert(key, value);
    }
    props
}

/// `{"text"}` / `{'text'}` / `` {`text`} `` are string literals; other
/// expressions keep their source text
fn unquote(expr: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if expr.len() >= 2 && expr.starts_with(quote) && expr.ends_with(quote) {
            return &expr[1..expr.len() - 1];
        }
    }
    expr
}

/// Byte ranges of fenced code blocks and inline code spans
fn code_ranges(source: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut fence: Option<(usize, &str)> = None;
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };

        match (fence, marker) {
            (None, Some(m)) => fence = Some((offset, m)),
            (Some((start, open)), Some(m)) if m == open => {
                ranges.push(start..offset + line.len());
                fence = None;
            }
            _ => {}
        }
        offset += line.len();
    }
    if let Some((start, _)) = fence {
        ranges.push(start..source.len());
    }

    let fenced = ranges.clone();
    for m in INLINE_CODE.find_iter(source) {
        if !fenced.iter().any(|r| r.contains(&m.start())) {
            ranges.push(m.range());
        }
    }

    ranges
}
