use crate::{
    domain::{
        post::{
            model::SentimentResult,
            repository::{PostQuery, PostRepository},
        },
        sentiment::{analyse_sentiment, SentimentScorer},
    },
    infra::api::reddit::PostSource,
};
use anyhow::{Context, Result};

/// トピックの分析結果を取得するワークフロー（依存性を注入）
///
/// 1. 保存済みの分析結果があれば新しい順に最大limit件を返す
/// 2. 無ければ投稿を取得し、感情分析して保存したうえで返す
///
/// 取得元の失敗は0件として扱う。保存済みの件数がlimitに満たなくても再取得はしない。
pub async fn analyze_topic(
    repository: &dyn PostRepository,
    source: &dyn PostSource,
    scorer: &dyn SentimentScorer,
    topic: &str,
    limit: u32,
) -> Result<Vec<SentimentResult>> {
    let query = PostQuery::new(topic, i64::from(limit));
    let stored = repository
        .search_recent(&query)
        .await
        .context("分析済み投稿の検索に失敗")?;

    if !stored.is_empty() {
        tracing::info!("テーブルから取得: topic={}, {}件", topic, stored.len());
        return Ok(stored.iter().map(|row| row.to_result()).collect());
    }

    let posts = match source.search_posts(topic, limit).await {
        Ok(posts) => {
            tracing::info!("投稿を取得: topic={}, {}件", topic, posts.len());
            posts
        }
        Err(e) => {
            tracing::warn!("投稿の取得に失敗（0件として続行）: topic={}, error={}", topic, e);
            Vec::new()
        }
    };

    let results = analyse_sentiment(&posts, scorer);
    let inserted = repository
        .store(topic, &results)
        .await
        .context("分析結果の保存に失敗")?;
    tracing::info!("{}", inserted);

    Ok(results)
}
