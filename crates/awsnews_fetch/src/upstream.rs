use std::collections::HashSet;

use async_trait::async_trait;
use awsnews_core::{ArticleRecord, ArticleSource, Error, PostType, Result, ServiceConfig};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::http::build_client;

/// Client for the article index endpoint.
#[derive(Debug, Clone)]
pub struct AwsNewsClient {
    client: Client,
    api_url: String,
}

impl AwsNewsClient {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(build_client(config)?, config.api_url.clone()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl ArticleSource for AwsNewsClient {
    async fn fetch_all(&self) -> Result<Vec<ArticleRecord>> {
        let response = self
            .client
            .get(&self.api_url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("Error downloading data: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!("API error: {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("Error reading response: {}", e)))?;

        let records = parse_articles(&body)?;
        info!("📥 Fetched {} articles from {}", records.len(), self.api_url);
        Ok(records)
    }
}

/// Entry as it comes off the wire. Fields are read by hand so a wrongly typed optional field
/// falls back to its default instead of sinking the whole record.
#[derive(Debug)]
struct RawArticle<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawArticle<'a> {
    fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// First key present with a non-blank string value
    fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.fields.get(*key) {
            Some(Value::String(s)) => non_blank(Some(s.clone())),
            _ => None,
        })
    }

    fn flag(&self, key: &str) -> bool {
        self.fields.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    fn into_record(self) -> Option<ArticleRecord> {
        let title = self.text(&["title"])?;
        let url = self.text(&["url"])?;
        let published = ["published_date", "date"]
            .iter()
            .filter_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .find_map(parse_published_date)?;
        let slug = self.text(&["slug"]).unwrap_or_default();

        let id = match self.fields.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ if !slug.is_empty() => slug.clone(),
            _ => url.clone(),
        };

        Some(ArticleRecord {
            id,
            title,
            url,
            slug,
            category: self.text(&["main_category", "category"]).unwrap_or_default(),
            post_type: PostType::from_upstream(self.text(&["type"]).as_deref()),
            published,
            popular: self.flag("popular"),
            regional_expansion: self.flag("is_regional_expansion"),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parses an index payload: either a bare array or `{"articles": [...]}`.
///
/// Records that are missing a title, url or readable date are dropped, as are
/// repeats of an id already seen. Upstream order is kept.
pub fn parse_articles(body: &str) -> Result<Vec<ArticleRecord>> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| Error::UpstreamUnavailable(format!("Invalid JSON from article index: {}", e)))?;

    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("articles") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(Error::UpstreamUnavailable(
                    "Article index response has no articles array".to_string(),
                ))
            }
        },
        _ => {
            return Err(Error::UpstreamUnavailable(
                "Unexpected article index response shape".to_string(),
            ))
        }
    };

    let total = entries.len();
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(total);

    for entry in entries {
        let record = match &entry {
            Value::Object(fields) => RawArticle::new(fields).into_record(),
            other => {
                debug!("Skipping non-object article entry: {}", other);
                None
            }
        };

        match record {
            Some(record) if seen.insert(record.id.clone()) => records.push(record),
            Some(record) => debug!("Skipping duplicate article id {}", record.id),
            None => {}
        }
    }

    if records.len() < total {
        debug!("Dropped {} of {} article entries", total - records.len(), total);
    }

    Ok(records)
}

/// Reduces an upstream timestamp to its UTC calendar date.
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
