//! Component registry - merged global + local lookup with a safe fallback

use indexmap::IndexMap;
use std::sync::Arc;

use super::{Component, ComponentRef, ComponentSet, Props};
use crate::helpers::html_escape;

/// Where a registered component came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Local,
}

#[derive(Debug, Clone)]
struct Entry {
    component: ComponentRef,
    scope: Scope,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && Arc::ptr_eq(&self.component, &other.component)
    }
}

/// Merged view of the global and article-local component sets.
///
/// Local entries shadow global ones of the same name. Lookups through
/// [`Registry::get`] never fail: unknown names yield a [`MissingComponent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
}

impl Registry {
    /// Merge `global` and `local`; `local` wins on collisions
    pub fn build(global: &ComponentSet, local: &ComponentSet) -> Self {
        let mut entries = IndexMap::with_capacity(global.len() + local.len());

        for (name, component) in global.iter() {
            entries.insert(
                name.to_string(),
                Entry {
                    component: Arc::clone(component),
                    scope: Scope::Global,
                },
            );
        }

        for (name, component) in local.iter() {
            if entries.contains_key(name) {
                tracing::debug!("Local component `{}` shadows the global one", name);
            }
            entries.insert(
                name.to_string(),
                Entry {
                    component: Arc::clone(component),
                    scope: Scope::Local,
                },
            );
        }

        Self { entries }
    }

    /// Look up a component, substituting a placeholder when it is unregistered
    pub fn get(&self, name: &str) -> ComponentRef {
        match self.entries.get(name) {
            Some(entry) => Arc::clone(&entry.component),
            None => {
                tracing::warn!("Component `{}` not found, rendering placeholder", name);
                Arc::new(MissingComponent::new(name))
            }
        }
    }

    /// Look up a component without the fallback
    pub fn lookup(&self, name: &str) -> Option<&ComponentRef> {
        self.entries.get(name).map(|e| &e.component)
    }

    pub fn scope_of(&self, name: &str) -> Option<Scope> {
        self.entries.get(name).map(|e| e.scope)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names from `required` that neither scope provides
    pub fn missing<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .map(String::as_str)
            .filter(|name| !self.contains(name))
            .collect()
    }
}

/// Placeholder rendered in place of an unregistered component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingComponent {
    name: String,
}

impl MissingComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Component for MissingComponent {
    fn render(&self, _props: &Props, _children: &str) -> String {
        format!(
            r#"<div class="mdx-missing-component" style="border: 1px solid #ff6b6b; background: #fff0f0; padding: 8px 12px; border-radius: 4px">Component "{}" not found</div>"#,
            html_escape(&self.name)
        )
    }
}
