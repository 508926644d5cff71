use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Classification of an upstream post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostType {
    News,
    Blog,
}

impl PostType {
    /// Maps the upstream `type` field. Anything missing or unrecognized is a blog post.
    pub fn from_upstream(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("news") => PostType::News,
            _ => PostType::Blog,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::News => "News",
            PostType::Blog => "Blog",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query-time post type selector. `Both` is never stored on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostTypeFilter {
    News,
    Blog,
    #[default]
    Both,
}

impl PostTypeFilter {
    pub fn matches(&self, post_type: PostType) -> bool {
        match self {
            PostTypeFilter::News => post_type == PostType::News,
            PostTypeFilter::Blog => post_type == PostType::Blog,
            PostTypeFilter::Both => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostTypeFilter::News => "News",
            PostTypeFilter::Blog => "Blog",
            PostTypeFilter::Both => "Both",
        }
    }
}

impl FromStr for PostTypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news" => Ok(PostTypeFilter::News),
            "blog" => Ok(PostTypeFilter::Blog),
            "both" => Ok(PostTypeFilter::Both),
            other => Err(Error::InvalidArgument(format!(
                "post_type must be one of News, Blog or Both (got {:?})",
                other
            ))),
        }
    }
}

impl fmt::Display for PostTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One post from the article index, as of a single snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub slug: String,
    pub category: String,
    pub post_type: PostType,
    pub published: NaiveDate,
    pub popular: bool,
    pub regional_expansion: bool,
}

/// The shape a record takes when handed back through a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub category: String,
    pub published_date: String,
    pub url: String,
    pub slug: String,
    pub is_popular: bool,
    pub is_regional_expansion: bool,
}

impl From<&ArticleRecord> for ArticleSummary {
    fn from(record: &ArticleRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            post_type: record.post_type,
            category: record.category.clone(),
            published_date: record.published.format("%Y-%m-%d").to_string(),
            url: record.url.clone(),
            slug: record.slug.clone(),
            is_popular: record.popular,
            is_regional_expansion: record.regional_expansion,
        }
    }
}

/// Readable text and metadata pulled out of a single article page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    pub description: String,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub content_length: usize,
    pub word_count: usize,
}

impl ExtractedArticle {
    /// Builds the article and derives `content_length` and `word_count` from `content`.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        description: impl Into<String>,
        author: Option<String>,
        published_date: Option<String>,
    ) -> Self {
        let content = content.into();
        let content_length = content.chars().count();
        let word_count = content.split_whitespace().count();
        Self {
            url: url.into(),
            title: title.into(),
            content,
            description: description.into(),
            author,
            published_date,
            content_length,
            word_count,
        }
    }
}
