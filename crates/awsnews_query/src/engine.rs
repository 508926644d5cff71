use std::collections::BTreeSet;

use awsnews_core::ArticleRecord;
use chrono::NaiveDate;

use crate::criteria::FilterCriteria;

/// Applies `criteria` to a snapshot.
///
/// Filters run in a fixed order (post type, dates, category, popularity, text), then
/// the survivors are ordered newest first and cut to `limit`. Records published on
/// the same day keep their snapshot order.
pub fn query(records: &[ArticleRecord], criteria: &FilterCriteria, today: NaiveDate) -> Vec<ArticleRecord> {
    let (from, to) = criteria.window.resolve(today);
    let needle = criteria.text.as_deref().map(str::to_lowercase);

    let mut matched: Vec<&ArticleRecord> = records
        .iter()
        .filter(|r| criteria.post_type.matches(r.post_type))
        .filter(|r| from.map_or(true, |from| r.published >= from))
        .filter(|r| to.map_or(true, |to| r.published <= to))
        .filter(|r| criteria.category.as_deref().map_or(true, |c| r.category == c))
        .filter(|r| !criteria.popular_only || r.popular)
        .filter(|r| needle.as_deref().map_or(true, |n| matches_text(r, n)))
        .collect();

    // sort_by is stable
    matched.sort_by(|a, b| b.published.cmp(&a.published));
    matched.into_iter().take(criteria.limit).cloned().collect()
}

fn matches_text(record: &ArticleRecord, needle: &str) -> bool {
    [&record.title, &record.url, &record.slug]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Distinct non-empty category names in the snapshot, sorted.
pub fn categories(records: &[ArticleRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.category.as_str())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
