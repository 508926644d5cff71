use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use awsnews_core::{
    ArticleRecord, ArticleSource, Error, ManualClock, PageFetcher, PostType, Result, ServiceConfig,
};
use awsnews_query::NewsTools;
use chrono::{Days, NaiveDate, TimeZone, Utc};

struct FixtureSource {
    records: Mutex<Vec<ArticleRecord>>,
    calls: AtomicUsize,
}

impl FixtureSource {
    fn new(records: Vec<ArticleRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            calls: AtomicUsize::new(0),
        }
    }

    fn push(&self, record: ArticleRecord) {
        self.records.lock().unwrap().insert(0, record);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleSource for FixtureSource {
    async fn fetch_all(&self) -> Result<Vec<ArticleRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().clone())
    }
}

struct CountingPages {
    calls: AtomicUsize,
}

#[async_trait]
impl PageFetcher for CountingPages {
    async fn fetch_page(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(r#"<html><head><title>Launch</title></head>
            <body><h1>Launch day</h1><div class="blog-post-content"><p>We   launched
            something</p><p>today.</p></div></body></html>"#
            .to_string())
    }
}

struct Harness {
    tools: NewsTools,
    source: Arc<FixtureSource>,
    pages: Arc<CountingPages>,
    clock: Arc<ManualClock>,
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
}

fn record(id: &str, days_ago: u64, post_type: PostType, category: &str) -> ArticleRecord {
    ArticleRecord {
        id: id.to_string(),
        title: format!("Post {}", id),
        url: format!("https://aws.amazon.com/blogs/aws/{}/", id),
        slug: id.to_string(),
        category: category.to_string(),
        post_type,
        published: today() - Days::new(days_ago),
        popular: false,
        regional_expansion: false,
    }
}

fn harness(records: Vec<ArticleRecord>) -> Harness {
    let source = Arc::new(FixtureSource::new(records));
    let pages = Arc::new(CountingPages {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap()));
    let tools = NewsTools::new(source.clone(), pages.clone(), clock.clone(), &ServiceConfig::default());
    Harness {
        tools,
        source,
        pages,
        clock,
    }
}

fn mixed_fixture() -> Vec<ArticleRecord> {
    let mut popular = record("popular-news", 2, PostType::News, "Compute");
    popular.popular = true;
    popular.title = "AWS Lambda adds new runtime".to_string();

    vec![
        record("news-today", 0, PostType::News, "Storage"),
        popular,
        record("blog-5", 5, PostType::Blog, "Compute"),
        record("blog-20", 20, PostType::Blog, "Databases"),
        record("blog-100", 100, PostType::Blog, "Analytics"),
    ]
}

fn ids(response: &awsnews_query::ArticleListResponse) -> Vec<&str> {
    response.articles.iter().map(|a| a.id.as_str()).collect()
}

#[tokio::test]
async fn test_machine_learning_category_example() {
    // Ten ML blog posts, one every five days, spanning 45 days
    let records: Vec<ArticleRecord> = (0..10)
        .map(|i| record(&format!("ml-{}", i), i * 5, PostType::Blog, "Machine Learning"))
        .collect();
    let h = harness(records);

    let response = h
        .tools
        .get_posts_by_category("Machine Learning", "Blog", 30, 5)
        .await
        .unwrap();

    assert_eq!(ids(&response), vec!["ml-0", "ml-1", "ml-2", "ml-3", "ml-4"]);
    assert_eq!(response.total_count, 5);
    let dates: Vec<&str> = response.articles.iter().map(|a| a.published_date.as_str()).collect();
    assert_eq!(dates, vec!["2024-05-31", "2024-05-26", "2024-05-21", "2024-05-16", "2024-05-11"]);
    assert_eq!(response.filters_applied.category.as_deref(), Some("Machine Learning"));
}

#[tokio::test]
async fn test_list_tools_hit_cache_within_window() {
    let h = harness(mixed_fixture());

    let first = h.tools.get_latest_posts("Both", 20, 7).await.unwrap();
    h.source.push(record("fresh", 0, PostType::News, "Storage"));
    h.clock.advance(chrono::Duration::minutes(4));
    let second = h.tools.get_latest_posts("Both", 20, 7).await.unwrap();

    assert_eq!(ids(&first), ids(&second));
    assert_eq!(h.source.calls(), 1);

    h.clock.advance(chrono::Duration::minutes(2));
    let third = h.tools.get_latest_posts("Both", 20, 7).await.unwrap();
    assert_eq!(ids(&third)[0], "fresh");
    assert_eq!(h.source.calls(), 2);
}

#[tokio::test]
async fn test_list_tools_share_one_snapshot() {
    let h = harness(mixed_fixture());

    h.tools.get_todays_posts("Both", 20).await.unwrap();
    h.tools.get_posts_by_date(None, None, None, "Both", 50).await.unwrap();
    h.tools.get_posts_by_category("Compute", "Both", 30, 30).await.unwrap();
    h.tools.get_popular_posts("Both", 30, 15).await.unwrap();
    h.tools.get_categories().await.unwrap();

    assert_eq!(h.source.calls(), 1);
    let stats = h.tools.cache().stats().await;
    assert_eq!((stats.hits, stats.misses), (4, 1));
}

#[tokio::test]
async fn test_search_bypasses_cache() {
    let h = harness(mixed_fixture());

    h.tools.get_latest_posts("Both", 20, 7).await.unwrap();
    let first = h.tools.search_posts("lambda", "Both", 90, 25).await.unwrap();
    let second = h.tools.search_posts("LAMBDA", "Both", 90, 25).await.unwrap();

    assert_eq!(h.source.calls(), 3);
    assert_eq!(ids(&first), vec!["popular-news"]);
    assert_eq!(ids(&first), ids(&second));

    // Search results are not stored; the cached snapshot is still the first one
    h.source.push(record("lambda-fresh", 0, PostType::Blog, "Compute"));
    let third = h.tools.search_posts("lambda", "Both", 90, 25).await.unwrap();
    assert_eq!(ids(&third), vec!["lambda-fresh", "popular-news"]);
    let latest = h.tools.get_latest_posts("Both", 20, 7).await.unwrap();
    assert!(!ids(&latest).contains(&"lambda-fresh"));
}

#[tokio::test]
async fn test_todays_posts() {
    let h = harness(mixed_fixture());
    let response = h.tools.get_todays_posts("Both", 20).await.unwrap();
    assert_eq!(ids(&response), vec!["news-today"]);
    assert_eq!(response.filters_applied.date.as_deref(), Some("today"));
}

#[tokio::test]
async fn test_posts_by_date_defaults_to_last_week() {
    let h = harness(mixed_fixture());

    let response = h.tools.get_posts_by_date(None, None, None, "Both", 50).await.unwrap();
    assert_eq!(ids(&response), vec!["news-today", "popular-news", "blog-5"]);
    assert_eq!(response.filters_applied.days_back, Some(7));

    let response = h
        .tools
        .get_posts_by_date(Some("2024-05-01"), Some("2024-05-29"), None, "Blog", 50)
        .await
        .unwrap();
    assert_eq!(ids(&response), vec!["blog-5", "blog-20"]);

    // Upper bound only: no lower bound applied
    let response = h
        .tools
        .get_posts_by_date(None, Some("2024-05-26"), None, "Both", 50)
        .await
        .unwrap();
    assert_eq!(ids(&response), vec!["blog-5", "blog-20", "blog-100"]);
}

#[tokio::test]
async fn test_popular_posts() {
    let h = harness(mixed_fixture());
    let response = h.tools.get_popular_posts("Both", 30, 15).await.unwrap();
    assert_eq!(ids(&response), vec!["popular-news"]);
    assert!(response.filters_applied.popular_only);
    assert!(response.articles[0].is_popular);
}

#[tokio::test]
async fn test_categories_sorted_and_distinct() {
    let h = harness(mixed_fixture());
    let response = h.tools.get_categories().await.unwrap();
    assert_eq!(response.categories, vec!["Analytics", "Compute", "Databases", "Storage"]);
    assert_eq!(response.total_categories, 4);
    assert_eq!(response.message, "Found 4 categories");
}

#[tokio::test]
async fn test_post_type_filter_is_exact() {
    let h = harness(mixed_fixture());
    let response = h.tools.get_latest_posts("news", 20, 365).await.unwrap();
    assert!(response.articles.iter().all(|a| a.post_type == PostType::News));
    assert_eq!(response.total_count, 2);
}

#[tokio::test]
async fn test_invalid_arguments_touch_nothing() {
    let h = harness(mixed_fixture());

    let results = vec![
        h.tools.get_todays_posts("Podcast", 20).await.err(),
        h.tools.get_todays_posts("Both", 0).await.err(),
        h.tools.get_latest_posts("Both", 20, -1).await.err(),
        h.tools.get_posts_by_date(Some("2024-05-01"), None, Some(3), "Both", 10).await.err(),
        h.tools.get_posts_by_date(Some("2024-05-10"), Some("2024-05-01"), None, "Both", 10).await.err(),
        h.tools.get_posts_by_date(Some("May 1st"), None, None, "Both", 10).await.err(),
        h.tools.get_posts_by_category("  ", "Both", 30, 30).await.err(),
        h.tools.search_posts("   ", "Both", 90, 25).await.err(),
        h.tools.get_popular_posts("Both", 30, -5).await.err(),
    ];

    for err in results {
        assert!(matches!(err, Some(Error::InvalidArgument(_))), "{:?}", err);
    }
    assert_eq!(h.source.calls(), 0);
    assert!(h.tools.cache().entry().await.is_none());
}

#[tokio::test]
async fn test_article_content() {
    let h = harness(vec![]);

    let response = h
        .tools
        .get_article_content("https://aws.amazon.com/blogs/aws/launch/")
        .await
        .unwrap();
    assert!(response.success);
    assert_eq!(response.article.title, "Launch day");
    assert_eq!(response.article.content, "We launched something today.");
    assert_eq!(response.article.content_length, response.article.content.chars().count());
    assert_eq!(response.article.word_count, 4);
    assert_eq!(h.pages.calls.load(Ordering::SeqCst), 1);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["word_count"], 4);
    assert!(json["author"].is_null());
}

#[tokio::test]
async fn test_article_content_rejects_other_domains_without_fetching() {
    let h = harness(vec![]);

    let err = h
        .tools
        .get_article_content("https://blog.example.com/aws.amazon.com/post")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedDomain(_)));
    assert_eq!(h.pages.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.source.calls(), 0);
}
