//! HTML template components loaded from `components/<Name>.html`

use anyhow::Result;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::{Component, ComponentSet, Props};
use crate::helpers::html_escape;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid placeholder regex");
}

/// A component defined by an HTML snippet.
///
/// `{{ children }}` is replaced by the rendered children verbatim; any other
/// `{{ prop }}` by the HTML-escaped prop value, or nothing when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateComponent {
    source: String,
}

impl TemplateComponent {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Component for TemplateComponent {
    fn render(&self, props: &Props, children: &str) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures| match &caps[1] {
                "children" => children.to_string(),
                key => props.get(key).map(|v| html_escape(v)).unwrap_or_default(),
            })
            .into_owned()
    }
}

/// Load every `*.html` file in `dir` as a component named after its file stem.
///
/// A missing directory yields an empty set.
pub fn load_template_dir(dir: &Path) -> Result<ComponentSet> {
    let mut set = ComponentSet::new();
    if !dir.is_dir() {
        return Ok(set);
    }

    let pattern = dir.join("*.html");
    let mut paths: Vec<_> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| entry.ok())
        .collect();
    paths.sort();

    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_component_name(name) {
            tracing::warn!(
                "Skipping {:?}: component names must start with an uppercase letter",
                path
            );
            continue;
        }
        let source = fs::read_to_string(&path)?;
        tracing::debug!("Loaded component template `{}` from {:?}", name, path);
        set.insert(name, Arc::new(TemplateComponent::new(source)));
    }

    Ok(set)
}

/// Component names are identifiers starting with an uppercase ASCII letter
pub(crate) fn is_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
