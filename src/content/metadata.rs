//! Article metadata (`metadata.yml`)

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a `metadata.yml`
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read metadata: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid metadata: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("article title must not be empty")]
    EmptyTitle,
    #[error("invalid slug `{0}`: use letters, digits, `-` or `_`")]
    InvalidSlug(String),
}

/// Author shown on the article page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Metadata of one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub title: String,
    pub slug: String,
    #[serde(deserialize_with = "date")]
    pub publish_date: NaiveDate,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<NaiveDate>,
    pub summary: String,
    #[serde(default, deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    /// Articles stay drafts until explicitly published
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl ArticleMetadata {
    /// Parse and validate metadata from YAML
    pub fn from_yaml(content: &str) -> Result<Self, MetadataError> {
        let metadata: ArticleMetadata = serde_yaml::from_str(content)?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Load metadata from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.title.trim().is_empty() {
            return Err(MetadataError::EmptyTitle);
        }
        if !is_valid_slug(&self.slug) {
            return Err(MetadataError::InvalidSlug(self.slug.clone()));
        }
        Ok(())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Slugs are URL-safe tokens: ASCII letters, digits, `-` and `_`
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse a date written as a plain date or as a timestamp
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date `{}`", s)))
}

fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{}`", s))),
        None => Ok(None),
    }
}

/// Accept `tags: rust` as well as `tags: [rust, mdx]`
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        None(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::None(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata() {
        let yaml = r#"
title: My First Blog Post
slug: first-post
publishDate: 2025-05-13
lastUpdated: "2025-05-14T08:00:00Z"
summary: An introduction to my new blog.
tags:
  - react
  - mdx
published: true
coverImage: /images/first-post.jpg
author:
  name: Ian Chou
  avatar: /images/avatars/default.png
"#;
        let meta = ArticleMetadata::from_yaml(yaml).unwrap();
        assert_eq!(meta.slug, "first-post");
        assert_eq!(meta.publish_date, NaiveDate::from_ymd_opt(2025, 5, 13).unwrap());
        assert_eq!(meta.last_updated, NaiveDate::from_ymd_opt(2025, 5, 14));
        assert_eq!(meta.tags, vec!["react", "mdx"]);
        assert!(meta.published);
        assert_eq!(meta.author.unwrap().name, "Ian Chou");
        assert!(meta.og_image.is_none());
    }

    #[test]
    fn test_defaults_to_unpublished() {
        let yaml = "title: Draft\nslug: draft\npublishDate: 2025-01-01\nsummary: wip\ntags: notes\n";
        let meta = ArticleMetadata::from_yaml(yaml).unwrap();
        assert!(!meta.published);
        assert_eq!(meta.tags, vec!["notes"]);
    }

    #[test]
    fn test_rejects_empty_title() {
        let yaml = "title: '  '\nslug: x\npublishDate: 2025-01-01\nsummary: s\n";
        assert!(matches!(
            ArticleMetadata::from_yaml(yaml),
            Err(MetadataError::EmptyTitle)
        ));
    }

    #[test]
    fn test_rejects_bad_slug() {
        let yaml = "title: T\nslug: has space\npublishDate: 2025-01-01\nsummary: s\n";
        assert!(matches!(
            ArticleMetadata::from_yaml(yaml),
            Err(MetadataError::InvalidSlug(_))
        ));
    }

    #[test]
    fn test_missing_summary_is_an_error() {
        let yaml = "title: T\nslug: t\npublishDate: 2025-01-01\n";
        assert!(matches!(
            ArticleMetadata::from_yaml(yaml),
            Err(MetadataError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 5, 11);
        assert_eq!(parse_date("2025-05-11"), expected);
        assert_eq!(parse_date("2025/05/11"), expected);
        assert_eq!(parse_date("2025-05-11 10:30:00"), expected);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("react-vite_mdx-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("a/b"));
    }
}
