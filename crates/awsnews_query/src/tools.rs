//! The eight tool operations.
//!
//! Each list tool is a named combination of [`FilterCriteria`] defaults. Arguments are
//! validated before the cache or the network is touched.

use std::sync::Arc;

use awsnews_cache::SnapshotCache;
use awsnews_core::logging::Logger;
use awsnews_core::{
    ArticleRecord, ArticleSource, ArticleSummary, Clock, Error, ExtractedArticle, PageFetcher,
    PostTypeFilter, Result, ServiceConfig, SystemClock,
};
use awsnews_fetch::{build_client, AwsNewsClient, ContentExtractor, HttpPageFetcher};
use serde::Serialize;

use crate::criteria::{parse_days_back, parse_limit, DateWindow, FilterCriteria};
use crate::engine;

/// Default arguments, per tool.
pub mod defaults {
    pub const POST_TYPE: &str = "Both";

    pub const TODAY_LIMIT: i64 = 20;

    pub const BY_DATE_DAYS_BACK: i64 = 7;
    pub const BY_DATE_LIMIT: i64 = 50;

    pub const CATEGORY_DAYS_BACK: i64 = 30;
    pub const CATEGORY_LIMIT: i64 = 30;

    pub const SEARCH_DAYS_BACK: i64 = 90;
    pub const SEARCH_LIMIT: i64 = 25;

    pub const LATEST_DAYS_BACK: i64 = 7;
    pub const LATEST_LIMIT: i64 = 20;

    pub const POPULAR_DAYS_BACK: i64 = 30;
    pub const POPULAR_LIMIT: i64 = 15;
}

/// The effective filters, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiltersApplied {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_back: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub post_type: String,
    pub limit: usize,
    pub popular_only: bool,
    pub sort: String,
}

impl From<&FilterCriteria> for FiltersApplied {
    fn from(criteria: &FilterCriteria) -> Self {
        let (days_back, from_date, to_date) = match criteria.window {
            DateWindow::Any => (None, None, None),
            DateWindow::DaysBack(days) => (Some(days), None, None),
            DateWindow::Between { from, to } => (
                None,
                from.map(|d| d.format("%Y-%m-%d").to_string()),
                to.map(|d| d.format("%Y-%m-%d").to_string()),
            ),
        };

        Self {
            date: None,
            from_date,
            to_date,
            days_back,
            category: criteria.category.clone(),
            query: criteria.text.clone(),
            post_type: criteria.post_type.to_string(),
            limit: criteria.limit,
            popular_only: criteria.popular_only,
            sort: "newest_first".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleListResponse {
    pub success: bool,
    pub articles: Vec<ArticleSummary>,
    pub total_count: usize,
    pub filters_applied: FiltersApplied,
}

impl ArticleListResponse {
    pub fn new(records: &[ArticleRecord], filters_applied: FiltersApplied) -> Self {
        let articles: Vec<ArticleSummary> = records.iter().map(ArticleSummary::from).collect();
        Self {
            success: true,
            total_count: articles.len(),
            articles,
            filters_applied,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<String>,
    pub total_categories: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleContentResponse {
    pub success: bool,
    #[serde(flatten)]
    pub article: ExtractedArticle,
}

/// Where a list tool reads its records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Cached,
    /// Straight from upstream, bypassing the cache in both directions
    Live,
}

pub struct NewsTools {
    cache: SnapshotCache,
    source: Arc<dyn ArticleSource>,
    extractor: ContentExtractor,
    clock: Arc<dyn Clock>,
}

impl NewsTools {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        pages: Arc<dyn PageFetcher>,
        clock: Arc<dyn Clock>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            cache: SnapshotCache::new(source.clone(), clock.clone(), config.cache_ttl),
            source,
            extractor: ContentExtractor::new(pages, config.allowed_domain.clone()),
            clock,
        }
    }

    /// Wires the real HTTP collaborators and the system clock.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = build_client(config)?;
        let source = Arc::new(AwsNewsClient::new(client.clone(), config.api_url.clone()));
        let pages = Arc::new(HttpPageFetcher::new(client));
        Ok(Self::new(source, pages, Arc::new(SystemClock), config))
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub async fn get_todays_posts(&self, post_type: &str, limit: i64) -> Result<ArticleListResponse> {
        let logger = Logger::new().with_prefix("get_todays_posts");
        let criteria = logged(&logger, build(post_type, limit, DateWindow::DaysBack(0)))?;
        let mut filters = FiltersApplied::from(&criteria);
        filters.date = Some("today".to_string());
        filters.days_back = None;
        self.list(&logger, criteria, filters, Freshness::Cached).await
    }

    /// With no date arguments at all, the last week is returned.
    pub async fn get_posts_by_date(
        &self,
        from_date: Option<&str>,
        to_date: Option<&str>,
        days_back: Option<i64>,
        post_type: &str,
        limit: i64,
    ) -> Result<ArticleListResponse> {
        let logger = Logger::new().with_prefix("get_posts_by_date");
        let criteria = logged(&logger, by_date_criteria(from_date, to_date, days_back, post_type, limit))?;
        let filters = FiltersApplied::from(&criteria);
        self.list(&logger, criteria, filters, Freshness::Cached).await
    }

    pub async fn get_posts_by_category(
        &self,
        category: &str,
        post_type: &str,
        days_back: i64,
        limit: i64,
    ) -> Result<ArticleListResponse> {
        let logger = Logger::new().with_prefix("get_posts_by_category");
        let criteria = logged(&logger, category_criteria(category, post_type, days_back, limit))?;
        let filters = FiltersApplied::from(&criteria);
        self.list(&logger, criteria, filters, Freshness::Cached).await
    }

    /// Always reads a fresh index; the cache is neither consulted nor updated.
    pub async fn search_posts(
        &self,
        query: &str,
        post_type: &str,
        days_back: i64,
        limit: i64,
    ) -> Result<ArticleListResponse> {
        let logger = Logger::new().with_prefix("search_posts");
        let criteria = logged(&logger, search_criteria(query, post_type, days_back, limit))?;
        let filters = FiltersApplied::from(&criteria);
        self.list(&logger, criteria, filters, Freshness::Live).await
    }

    pub async fn get_categories(&self) -> Result<CategoriesResponse> {
        let logger = Logger::new().with_prefix("get_categories");
        let records = logged(&logger, self.cache.get_snapshot().await)?;
        let categories = engine::categories(&records);
        logger.info(&format!("Found {} categories", categories.len()));
        Ok(CategoriesResponse {
            success: true,
            total_categories: categories.len(),
            message: format!("Found {} categories", categories.len()),
            categories,
        })
    }

    pub async fn get_latest_posts(
        &self,
        post_type: &str,
        limit: i64,
        days_back: i64,
    ) -> Result<ArticleListResponse> {
        let logger = Logger::new().with_prefix("get_latest_posts");
        let criteria = logged(&logger, recent_criteria(post_type, days_back, limit))?;
        let filters = FiltersApplied::from(&criteria);
        self.list(&logger, criteria, filters, Freshness::Cached).await
    }

    pub async fn get_popular_posts(
        &self,
        post_type: &str,
        days_back: i64,
        limit: i64,
    ) -> Result<ArticleListResponse> {
        let logger = Logger::new().with_prefix("get_popular_posts");
        let criteria = logged(
            &logger,
            recent_criteria(post_type, days_back, limit).map(FilterCriteria::popular_only),
        )?;
        let filters = FiltersApplied::from(&criteria);
        self.list(&logger, criteria, filters, Freshness::Cached).await
    }

    pub async fn get_article_content(&self, url: &str) -> Result<ArticleContentResponse> {
        let logger = Logger::new().with_prefix("get_article_content");
        let article = logged(&logger, self.extractor.extract(url).await)?;
        logger.info(&format!(
            "Extracted {} ({} words)",
            article.url, article.word_count
        ));
        Ok(ArticleContentResponse {
            success: true,
            article,
        })
    }

    async fn list(
        &self,
        logger: &Logger,
        criteria: FilterCriteria,
        filters: FiltersApplied,
        freshness: Freshness,
    ) -> Result<ArticleListResponse> {
        let records = match freshness {
            Freshness::Cached => logged(logger, self.cache.get_snapshot().await)?,
            Freshness::Live => Arc::new(logged(logger, self.source.fetch_all().await)?),
        };

        let matched = engine::query(&records, &criteria, self.clock.today());
        logger.info(&format!("{} of {} articles matched", matched.len(), records.len()));
        Ok(ArticleListResponse::new(&matched, filters))
    }
}

fn build(post_type: &str, limit: i64, window: DateWindow) -> Result<FilterCriteria> {
    let post_type: PostTypeFilter = post_type.parse()?;
    let criteria = FilterCriteria::new(parse_limit(limit)?)
        .with_post_type(post_type)
        .with_window(window);
    criteria.validate()?;
    Ok(criteria)
}

fn recent_criteria(post_type: &str, days_back: i64, limit: i64) -> Result<FilterCriteria> {
    build(post_type, limit, DateWindow::DaysBack(parse_days_back(days_back)?))
}

fn by_date_criteria(
    from_date: Option<&str>,
    to_date: Option<&str>,
    days_back: Option<i64>,
    post_type: &str,
    limit: i64,
) -> Result<FilterCriteria> {
    let window = match DateWindow::from_args(from_date, to_date, days_back)? {
        DateWindow::Any => DateWindow::DaysBack(parse_days_back(defaults::BY_DATE_DAYS_BACK)?),
        window => window,
    };
    build(post_type, limit, window)
}

fn category_criteria(category: &str, post_type: &str, days_back: i64, limit: i64) -> Result<FilterCriteria> {
    if category.trim().is_empty() {
        return Err(Error::InvalidArgument("Category cannot be empty".to_string()));
    }
    Ok(recent_criteria(post_type, days_back, limit)?.with_category(category))
}

fn search_criteria(query: &str, post_type: &str, days_back: i64, limit: i64) -> Result<FilterCriteria> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::InvalidArgument("Search query cannot be empty".to_string()));
    }
    Ok(recent_criteria(post_type, days_back, limit)?.with_text(query))
}

fn logged<T>(logger: &Logger, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        if e.is_client_error() {
            logger.debug(&format!("Rejected: {}", e));
        } else {
            logger.warn(&format!("Failed: {}", e));
        }
    }
    result
}
