use crate::app::page::PageView;
use crate::app::state::AppState;
use crate::app::workflow::analyze_topic;
use crate::domain::post::model::SentimentResult;
use crate::infra::chart::ChartImages;
use crate::types::{AppError, AppResult};
use anyhow::Context;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

/// num_records 未指定時の取得件数
pub const DEFAULT_NUM_RECORDS: u32 = 10;

/// フォームまたはクエリで受け取るパラメータ
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnalyzeParams {
    pub topic: Option<String>,
    pub num_records: Option<String>,
}

impl AnalyzeParams {
    /// フォームの値を優先し、無い項目はクエリの値で補う
    pub fn merge(form: Option<AnalyzeParams>, query: AnalyzeParams) -> Self {
        let form = form.unwrap_or_default();
        Self {
            topic: non_empty(form.topic).or_else(|| non_empty(query.topic)),
            num_records: non_empty(form.num_records).or_else(|| non_empty(query.num_records)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// キャッシュキー `"<topic>_<limit>"`
pub fn cache_key(topic: &str, limit: u32) -> String {
    format!("{}_{}", topic, limit)
}

/// 取得件数を検証する（未指定なら既定値）
pub fn parse_num_records(raw: Option<&str>) -> AppResult<u32> {
    match raw {
        None => Ok(DEFAULT_NUM_RECORDS),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(AppError::bad_request("num_records must be a positive integer")),
        },
    }
}

/// ルーティングを構築
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/api/sentiment/", get(index).post(index))
        .route("/api/sentiment/analyze", get(analyze).post(analyze))
        .nest_service("/static", static_files)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let html = state.page.render(&PageView::index(DEFAULT_NUM_RECORDS))?;
    Ok(Html(html))
}

async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeParams>,
    form: Option<Form<AnalyzeParams>>,
) -> AppResult<Html<String>> {
    let params = AnalyzeParams::merge(form.map(|Form(f)| f), query);
    let topic = params
        .topic
        .ok_or_else(|| AppError::bad_request("Topic is required"))?;
    let limit = parse_num_records(params.num_records.as_deref())?;

    let key = cache_key(&topic, limit);
    if let Some(html) = state.cache.get(&key).await {
        tracing::info!("キャッシュから応答: key={}", key);
        return Ok(Html(html));
    }

    let results = analyze_topic(
        state.repository.as_ref(),
        state.source.as_ref(),
        state.scorer.as_ref(),
        &topic,
        limit,
    )
    .await?;

    let images = render_charts(&state, results.clone(), &topic).await?;
    let html = state
        .page
        .render(&PageView::analyzed(&topic, limit, &results, images))?;

    state.cache.set(&key, html.clone()).await;
    Ok(Html(html))
}

/// グラフ描画はブロッキングスレッドで行う
async fn render_charts(
    state: &AppState,
    results: Vec<SentimentResult>,
    topic: &str,
) -> anyhow::Result<ChartImages> {
    let renderer = state.renderer.clone();
    let topic = topic.to_string();

    let images = tokio::task::spawn_blocking(move || renderer.render(&results, &topic))
        .await
        .context("グラフ描画タスクの実行に失敗")?
        .context("グラフの描画に失敗")?;
    Ok(images)
}
