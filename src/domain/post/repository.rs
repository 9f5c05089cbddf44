use super::model::{AnalyzedPost, SentimentResult};
use crate::types::InsertResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::Mutex;

// 分析済み投稿の検索条件
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub topic: String,
    pub limit: i64,
}

impl PostQuery {
    pub fn new(topic: impl Into<String>, limit: i64) -> Self {
        Self {
            topic: topic.into(),
            limit,
        }
    }
}

/// 分析結果の配列をトピックに紐づけて保存する。
///
/// 1件ずつINSERTし、最後にまとめてコミットする。
/// 同じトピックの既存行は更新しない（追記のみ）。
pub async fn store_analyzed_posts(
    topic: &str,
    results: &[SentimentResult],
    pool: &PgPool,
) -> Result<InsertResult> {
    if results.is_empty() {
        return Ok(InsertResult::empty());
    }

    let mut tx = pool
        .begin()
        .await
        .context("トランザクションの開始に失敗しました")?;
    let mut inserted = 0;

    for result in results {
        let done = sqlx::query(
            r#"
            INSERT INTO sentiment_analysis (topic, title, content, sentiment, score)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(topic)
        .bind(&result.title)
        .bind(&result.content)
        .bind(result.sentiment.as_str())
        .bind(result.score)
        .execute(&mut *tx)
        .await
        .context("分析結果のデータベースへの挿入に失敗しました")?;

        inserted += done.rows_affected() as usize;
    }

    tx.commit()
        .await
        .context("トランザクションのコミットに失敗しました")?;

    Ok(InsertResult::new(inserted))
}

/// トピックの分析済み投稿を新しい順に最大limit件取得する。
pub async fn search_analyzed_posts(query: &PostQuery, pool: &PgPool) -> Result<Vec<AnalyzedPost>> {
    let posts = sqlx::query_as::<_, AnalyzedPost>(
        r#"
        SELECT id, topic, title, content, sentiment, score, created_at
        FROM sentiment_analysis
        WHERE topic = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(&query.topic)
    .bind(query.limit)
    .fetch_all(pool)
    .await
    .with_context(|| format!("分析済み投稿の取得に失敗: {}", query.topic))?;

    Ok(posts)
}

/// 分析済み投稿の永続化を抽象化するトレイト
///
/// 本番ではPostgreSQL、テストではメモリ上の実装を注入する。
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// トピックの分析済み投稿を新しい順に取得
    async fn search_recent(&self, query: &PostQuery) -> Result<Vec<AnalyzedPost>>;

    /// 分析結果を追記保存
    async fn store(&self, topic: &str, results: &[SentimentResult]) -> Result<InsertResult>;
}

/// `sqlx` を使用したPostgreSQL実装
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn search_recent(&self, query: &PostQuery) -> Result<Vec<AnalyzedPost>> {
        search_analyzed_posts(query, &self.pool).await
    }

    async fn store(&self, topic: &str, results: &[SentimentResult]) -> Result<InsertResult> {
        store_analyzed_posts(topic, results, &self.pool).await
    }
}

/// メモリ上に保持するリポジトリ実装
///
/// DBを用意せずにリクエストフロー全体を動かすために使う。
#[derive(Default)]
pub struct MemoryPostRepository {
    rows: Mutex<Vec<AnalyzedPost>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みの全行数
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn search_recent(&self, query: &PostQuery) -> Result<Vec<AnalyzedPost>> {
        let rows = self.rows.lock().await;
        let mut matched: Vec<AnalyzedPost> = rows
            .iter()
            .filter(|row| row.topic == query.topic)
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matched.truncate(query.limit.max(0) as usize);
        Ok(matched)
    }

    async fn store(&self, topic: &str, results: &[SentimentResult]) -> Result<InsertResult> {
        let mut rows = self.rows.lock().await;
        let now = Utc::now();

        for result in results {
            let id = rows.len() as i32 + 1;
            rows.push(AnalyzedPost {
                id,
                topic: topic.to_string(),
                title: result.title.clone(),
                content: result.content.clone(),
                sentiment: result.sentiment,
                score: result.score,
                created_at: now,
            });
        }

        Ok(InsertResult::new(results.len()))
    }
}
