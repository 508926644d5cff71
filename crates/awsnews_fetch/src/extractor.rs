//! Article page extraction
//!
//! All assumptions about how article pages are laid out live in this module.

use std::sync::Arc;

use awsnews_core::{Error, ExtractedArticle, PageFetcher, Result};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use url::Url;

use crate::jsonld;

/// Body containers, most specific first. The first selector with any match wins.
const BODY_SELECTORS: &[&str] = &[
    "div.blog-post-content",
    "div.entry-content",
    "article.post-content",
    "div.content",
    "main",
    ".blog-post-body",
    ".post-body",
    "article",
];

/// Subtrees that never contribute to body text.
const NOISE_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside", "noscript"];

/// Phrasing elements whose text flows into the surrounding sentence.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "em", "i", "kbd", "mark", "small", "span", "strong", "sub", "sup",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "meta[name='description']",
    "meta[property='og:description']",
];

const AUTHOR_SELECTORS: &[&str] = &[
    "meta[name='author']",
    "[property='author']",
    ".author",
    ".byline",
    ".post-author",
];

const DATE_SELECTORS: &[&str] = &[
    "time[datetime]",
    "meta[property='article:published_time']",
    ".publish-date",
    ".date",
];

/// Fetches pages from the allowed domain and turns them into [`ExtractedArticle`]s.
pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    allowed_domain: String,
}

impl ContentExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, allowed_domain: impl Into<String>) -> Self {
        Self {
            fetcher,
            allowed_domain: allowed_domain.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    /// Returns true if `url` is an http(s) URL on the allowed domain or one of its subdomains
    pub fn can_handle(&self, url: &str) -> bool {
        self.check_url(url).is_ok()
    }

    fn check_url(&self, url: &str) -> Result<Url> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| Error::InvalidArgument(format!("Failed to parse URL {:?}: {}", url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::UnsupportedDomain(format!(
                "Only http(s) articles on {} are supported (got {})",
                self.allowed_domain, url
            )));
        }

        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
        let on_domain = host == self.allowed_domain
            || host.ends_with(&format!(".{}", self.allowed_domain));
        if !on_domain {
            return Err(Error::UnsupportedDomain(format!(
                "This tool supports only articles on {} (got {})",
                self.allowed_domain,
                if host.is_empty() { url } else { host.as_str() }
            )));
        }

        Ok(parsed)
    }

    /// Fetch `url` once and extract it. The domain is checked before any request is made.
    pub async fn extract(&self, url: &str) -> Result<ExtractedArticle> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidArgument("Article URL cannot be empty".to_string()));
        }
        self.check_url(url)?;

        let html = self.fetcher.fetch_page(url).await?;
        parse_article(url, &html)
    }
}

/// Extracts title, body text and metadata from an article page.
///
/// Only a missing body container is an error; every other field degrades to
/// empty or `None`.
pub fn parse_article(url: &str, html: &str) -> Result<ExtractedArticle> {
    let document = Html::parse_document(html);

    let title = first_text(&document, &["h1", "title"]).unwrap_or_default();

    let content = extract_body(&document).ok_or_else(|| {
        Error::Parse(format!("No article body container found in {}", url))
    })?;

    let description = first_attr(&document, DESCRIPTION_SELECTORS, "content").unwrap_or_default();

    let author = first_value(&document, AUTHOR_SELECTORS).or_else(|| {
        let authors = jsonld::extract_authors(&document);
        (!authors.is_empty()).then(|| authors.join(", "))
    });

    let published_date = first_value(&document, DATE_SELECTORS)
        .or_else(|| jsonld::extract_date_published(&document));

    debug!(
        "Extracted {} ({} chars, author: {:?}, date: {:?})",
        url,
        content.chars().count(),
        author,
        published_date
    );

    Ok(ExtractedArticle::new(
        url,
        title,
        content,
        description,
        author,
        published_date,
    ))
}

fn extract_body(document: &Html) -> Option<String> {
    for selector_str in BODY_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let mut matched = false;
        let mut raw = String::new();
        for element in document.select(&selector) {
            // A container nested inside another match is already covered by its parent
            let nested = element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| selector.matches(&ancestor));
            if nested {
                continue;
            }
            matched = true;
            collect_text(element, &mut raw);
            raw.push(' ');
        }
        if matched {
            return Some(collapse_whitespace(&raw));
        }
    }
    None
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if NOISE_TAGS.contains(&el.name()) => {}
            Node::Element(el) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    // Adjacent blocks must not run words together
                    let block = !INLINE_TAGS.contains(&el.name());
                    if block {
                        out.push(' ');
                    }
                    collect_text(child_element, out);
                    if block {
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|selector_str| {
        let selector = Selector::parse(selector_str).ok()?;
        let element = document.select(&selector).next()?;
        let text = collapse_whitespace(&element.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    })
}

fn first_attr(document: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    selectors.iter().find_map(|selector_str| {
        let selector = Selector::parse(selector_str).ok()?;
        let value = document.select(&selector).next()?.value().attr(attr)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// First non-blank value among `selectors`: `content` for meta tags, `datetime` for time tags,
/// text otherwise.
fn first_value(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|selector_str| {
        let selector = Selector::parse(selector_str).ok()?;
        let element = document.select(&selector).next()?;
        let value = match element.value().name() {
            "meta" => element.value().attr("content").unwrap_or_default().trim().to_string(),
            "time" => element.value().attr("datetime").unwrap_or_default().trim().to_string(),
            _ => collapse_whitespace(&element.text().collect::<String>()),
        };
        (!value.is_empty()).then_some(value)
    })
}
