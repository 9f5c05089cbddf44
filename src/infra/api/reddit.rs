use crate::domain::post::model::Post;
use crate::infra::config::RedditConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

/// 取得リクエストのタイムアウト（秒）
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// 投稿取得の失敗理由
#[derive(Error, Debug)]
pub enum FetchError {
    /// 認証情報が設定されていない
    #[error("Reddit APIの認証情報が設定されていません: {name}")]
    MissingCredentials { name: &'static str },

    /// 通信エラー（接続失敗・タイムアウトなど）
    #[error("Reddit APIへのリクエストに失敗: {endpoint} - {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 成功以外のHTTPステータス（認証失敗・レート制限など）
    #[error("Reddit APIがエラーを返しました: {endpoint} (status {status})")]
    Status { endpoint: String, status: u16 },

    /// レスポンスの形式が想定と異なる
    #[error("Reddit APIのレスポンス解析に失敗: {endpoint} - {reason}")]
    Payload { endpoint: String, reason: String },

    /// 取得元が利用できない（モックなど）
    #[error("投稿の取得元が利用できません: {reason}")]
    Unavailable { reason: String },
}

/// 投稿取得元の抽象化トレイト
///
/// 実際のAPI通信とモック実装を統一的に扱うためのインターフェースです。
/// 失敗は `FetchError` として返し、空扱いにするかどうかは呼び出し側が決めます。
#[async_trait]
pub trait PostSource: Send + Sync {
    /// トピックを新しい順に検索して最大limit件の投稿を返す
    async fn search_posts(&self, topic: &str, limit: u32) -> Result<Vec<Post>, FetchError>;
}

// --- Reddit APIのレスポンス型 ---

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    url: String,
}

/// `reqwest` を使用したReddit検索クライアント（読み取り専用）
pub struct RedditClient {
    client: Client,
    config: RedditConfig,
}

impl RedditClient {
    /// 新しいクライアントを作成
    pub fn new(config: RedditConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("HTTPクライアントの初期化に失敗")?;
        Ok(Self { client, config })
    }

    fn credentials(&self) -> Result<(&str, &str, &str), FetchError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(FetchError::MissingCredentials {
                name: "REDDIT_CLIENT_ID",
            })?;
        let client_secret =
            self.config
                .client_secret
                .as_deref()
                .ok_or(FetchError::MissingCredentials {
                    name: "REDDIT_CLIENT_SECRET",
                })?;
        let user_agent = self
            .config
            .user_agent
            .as_deref()
            .ok_or(FetchError::MissingCredentials {
                name: "REDDIT_USER_AGENT",
            })?;
        Ok((client_id, client_secret, user_agent))
    }

    /// アプリケーション専用（client_credentials）のアクセストークンを取得
    async fn fetch_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
    ) -> Result<String, FetchError> {
        let endpoint = format!(
            "{}/api/v1/access_token",
            self.config.auth_base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&endpoint)
            .basic_auth(client_id, Some(client_secret))
            .header(reqwest::header::USER_AGENT, user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|source| FetchError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let token: AccessTokenResponse =
            response.json().await.map_err(|e| FetchError::Payload {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn search_posts(&self, topic: &str, limit: u32) -> Result<Vec<Post>, FetchError> {
        let (client_id, client_secret, user_agent) = self.credentials()?;
        let token = self
            .fetch_access_token(client_id, client_secret, user_agent)
            .await?;

        // r/all 全体を対象に新しい順で検索する
        let endpoint = format!(
            "{}/r/all/search",
            self.config.api_base_url.trim_end_matches('/')
        );
        let limit = limit.to_string();

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, user_agent)
            .query(&[
                ("q", topic),
                ("sort", "new"),
                ("t", "all"),
                ("limit", limit.as_str()),
                ("restrict_sr", "false"),
                ("raw_json", "1"),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let listing: Listing = response.json().await.map_err(|e| FetchError::Payload {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let posts = listing
            .data
            .children
            .into_iter()
            .map(|child| Post::new(child.data.title, child.data.selftext, child.data.url))
            .collect();

        Ok(posts)
    }
}

/// テスト用のモック取得元
///
/// 定義済みの投稿またはエラーを返し、呼び出し回数を記録します。
pub struct MockPostSource {
    /// モック時に返す投稿
    pub posts: Vec<Post>,
    /// 成功/失敗の制御
    pub should_succeed: bool,
    /// エラー時に返すメッセージ
    pub error_message: Option<String>,
    calls: AtomicUsize,
}

impl MockPostSource {
    /// 成功レスポンスを返すモックを作成
    pub fn new_success(posts: Vec<Post>) -> Self {
        Self {
            posts,
            should_succeed: true,
            error_message: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// エラーを返すモックを作成
    pub fn new_error(error_message: &str) -> Self {
        Self {
            posts: Vec::new(),
            should_succeed: false,
            error_message: Some(error_message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// search_postsが呼ばれた回数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostSource for MockPostSource {
    async fn search_posts(&self, _topic: &str, limit: u32) -> Result<Vec<Post>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.should_succeed {
            Ok(self.posts.iter().take(limit as usize).cloned().collect())
        } else {
            Err(FetchError::Unavailable {
                reason: self
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Mock fetch error".to_string()),
            })
        }
    }
}
