use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;

/// 投稿本文が空の場合に代わりに入れる文字列
pub const NO_CONTENT_PLACEHOLDER: &str = "No content Available";

// 取得元APIから正規化した投稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl Post {
    /// 本文が空なら既定の文字列で補完して作成
    pub fn new(title: impl Into<String>, content: impl Into<String>, url: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            title: title.into(),
            content: if content.trim().is_empty() {
                NO_CONTENT_PLACEHOLDER.to_string()
            } else {
                content
            },
            url: url.into(),
        }
    }
}

// 感情の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    /// 複合スコアの符号で分類する（0はPOSITIVE）
    pub fn from_score(score: f64) -> Self {
        if score >= 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("不明な感情ラベル: {0}")]
pub struct UnknownSentiment(pub String);

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => Ok(Self::Positive),
            "NEGATIVE" => Ok(Self::Negative),
            _ => Err(UnknownSentiment(s.to_string())),
        }
    }
}

// 感情分析の結果（描画・ページ表示・保存に共通の形）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub title: String,
    pub content: String,
    pub sentiment: Sentiment,
    pub score: f64,
}

impl SentimentResult {
    /// スコアから分類を決めて作成
    pub fn new(title: impl Into<String>, content: impl Into<String>, score: f64) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            sentiment: Sentiment::from_score(score),
            score,
        }
    }
}

// 分析済み投稿エンティティ（sentiment_analysisテーブルと一致）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPost {
    pub id: i32,
    pub topic: String,
    pub title: String,
    pub content: String,
    pub sentiment: Sentiment,
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

impl AnalyzedPost {
    pub fn to_result(&self) -> SentimentResult {
        SentimentResult {
            title: self.title.clone(),
            content: self.content.clone(),
            sentiment: self.sentiment,
            score: self.score,
        }
    }
}

impl fmt::Display for AnalyzedPost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Sentiment Analysis: {}>", self.title)
    }
}

// sentiment列はテキストで保存しているため手動でデコードする
impl<'r> FromRow<'r, PgRow> for AnalyzedPost {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let raw_sentiment: String = row.try_get("sentiment")?;
        let sentiment = raw_sentiment
            .parse::<Sentiment>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "sentiment".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            topic: row.try_get("topic")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            sentiment,
            score: row.try_get("score")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
