use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use awsnews_query::tools::defaults;
use awsnews_query::{ArticleContentResponse, ArticleListResponse, CategoriesResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::AppState;

fn post_type() -> String {
    defaults::POST_TYPE.to_string()
}

fn today_limit() -> i64 {
    defaults::TODAY_LIMIT
}

fn by_date_limit() -> i64 {
    defaults::BY_DATE_LIMIT
}

fn category_days_back() -> i64 {
    defaults::CATEGORY_DAYS_BACK
}

fn category_limit() -> i64 {
    defaults::CATEGORY_LIMIT
}

fn search_days_back() -> i64 {
    defaults::SEARCH_DAYS_BACK
}

fn search_limit() -> i64 {
    defaults::SEARCH_LIMIT
}

fn latest_days_back() -> i64 {
    defaults::LATEST_DAYS_BACK
}

fn latest_limit() -> i64 {
    defaults::LATEST_LIMIT
}

fn popular_days_back() -> i64 {
    defaults::POPULAR_DAYS_BACK
}

fn popular_limit() -> i64 {
    defaults::POPULAR_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct TodayParams {
    #[serde(default = "post_type", alias = "type")]
    pub post_type: String,
    #[serde(default = "today_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct ByDateParams {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub days_back: Option<i64>,
    #[serde(default = "post_type", alias = "type")]
    pub post_type: String,
    #[serde(default = "by_date_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct CategoryParams {
    #[serde(default)]
    pub category: String,
    #[serde(default = "post_type", alias = "type")]
    pub post_type: String,
    #[serde(default = "category_days_back")]
    pub days_back: i64,
    #[serde(default = "category_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default, alias = "q")]
    pub query: String,
    #[serde(default = "post_type", alias = "type")]
    pub post_type: String,
    #[serde(default = "search_days_back")]
    pub days_back: i64,
    #[serde(default = "search_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct LatestParams {
    #[serde(default = "post_type", alias = "type")]
    pub post_type: String,
    #[serde(default = "latest_limit")]
    pub limit: i64,
    #[serde(default = "latest_days_back")]
    pub days_back: i64,
}

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    #[serde(default = "post_type", alias = "type")]
    pub post_type: String,
    #[serde(default = "popular_days_back")]
    pub days_back: i64,
    #[serde(default = "popular_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct ArticleParams {
    #[serde(default)]
    pub url: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn todays_posts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TodayParams>, QueryRejection>,
) -> ApiResult<Json<ArticleListResponse>> {
    let Query(params) = query?;
    let response = state
        .tools
        .get_todays_posts(&params.post_type, params.limit)
        .await?;
    Ok(Json(response))
}

pub async fn posts_by_date(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ByDateParams>, QueryRejection>,
) -> ApiResult<Json<ArticleListResponse>> {
    let Query(params) = query?;
    let response = state
        .tools
        .get_posts_by_date(
            params.from_date.as_deref(),
            params.to_date.as_deref(),
            params.days_back,
            &params.post_type,
            params.limit,
        )
        .await?;
    Ok(Json(response))
}

pub async fn posts_by_category(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CategoryParams>, QueryRejection>,
) -> ApiResult<Json<ArticleListResponse>> {
    let Query(params) = query?;
    let response = state
        .tools
        .get_posts_by_category(
            &params.category,
            &params.post_type,
            params.days_back,
            params.limit,
        )
        .await?;
    Ok(Json(response))
}

pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<ArticleListResponse>> {
    let Query(params) = query?;
    let response = state
        .tools
        .search_posts(&params.query, &params.post_type, params.days_back, params.limit)
        .await?;
    Ok(Json(response))
}

pub async fn categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<CategoriesResponse>> {
    Ok(Json(state.tools.get_categories().await?))
}

pub async fn latest_posts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LatestParams>, QueryRejection>,
) -> ApiResult<Json<ArticleListResponse>> {
    let Query(params) = query?;
    let response = state
        .tools
        .get_latest_posts(&params.post_type, params.limit, params.days_back)
        .await?;
    Ok(Json(response))
}

pub async fn popular_posts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PopularParams>, QueryRejection>,
) -> ApiResult<Json<ArticleListResponse>> {
    let Query(params) = query?;
    let response = state
        .tools
        .get_popular_posts(&params.post_type, params.days_back, params.limit)
        .await?;
    Ok(Json(response))
}

pub async fn article_content(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ArticleParams>, QueryRejection>,
) -> ApiResult<Json<ArticleContentResponse>> {
    let Query(params) = query?;
    Ok(Json(state.tools.get_article_content(&params.url).await?))
}
