use crate::infra::config::{CacheBackend, CacheConfig};
use crate::types::{InfraError, InfraResult};
use async_trait::async_trait;
use cached::{Cached, TimedSizedCache};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 分析ページの有効期限（秒）
pub const ANALYZE_CACHE_TIMEOUT_SECS: u64 = 3600;
/// メモリキャッシュの最大件数
pub const MEMORY_CACHE_CAPACITY: usize = 500;

/// 描画済みページのキャッシュを抽象化するトレイト
///
/// 読み書きの失敗はリクエストを失敗させない。読み込み失敗はミス扱い、
/// 書き込み失敗はログに残して無視する。
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String);
}

/// プロセス内の有効期限・件数上限付きキャッシュ
///
/// 上限を超えると最も古く使われたエントリから捨てる。
pub struct MemoryResponseCache {
    store: Mutex<TimedSizedCache<String, String>>,
}

impl MemoryResponseCache {
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_capacity(MEMORY_CACHE_CAPACITY, timeout_secs)
    }

    pub fn with_capacity(capacity: usize, timeout_secs: u64) -> Self {
        Self {
            store: Mutex::new(TimedSizedCache::with_size_and_lifespan(capacity, timeout_secs)),
        }
    }

    /// エントリの有効期限（秒）
    pub async fn lifespan_secs(&self) -> Option<u64> {
        self.store.lock().await.cache_lifespan()
    }

    /// 保持しているエントリ数（期限切れで未回収のものを含む）
    pub async fn len(&self) -> usize {
        self.store.lock().await.cache_size()
    }
}

/// 何も保存しないキャッシュ（CACHE_TYPE=null）
#[derive(Debug, Default)]
pub struct NullResponseCache;

#[async_trait]
impl ResponseCache for NullResponseCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: String) {}
}

#[async_trait]
impl ResponseCache for MemoryResponseCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut store = self.store.lock().await;
        store.cache_get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        let mut store = self.store.lock().await;
        // 期限切れのエントリを回収してから追加する
        store.flush();
        store.cache_set(key.to_string(), value);
    }
}

/// Redisを使ったキャッシュ（`SET key value EX ttl`）
pub struct RedisResponseCache {
    conn: ConnectionManager,
    timeout_secs: u64,
}

impl RedisResponseCache {
    /// 接続を確立して作成
    pub async fn connect(url: &str, timeout_secs: u64) -> InfraResult<Self> {
        let client = redis::Client::open(url).map_err(|e| InfraError::cache("Redisクライアント作成", e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| InfraError::cache("Redis接続", e))?;
        Ok(Self { conn, timeout_secs })
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("キャッシュの読み込みに失敗（ミスとして扱う）: key={}, error={}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: String) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, value, self.timeout_secs).await {
            tracing::warn!("キャッシュの書き込みに失敗: key={}, error={}", key, e);
        }
    }
}

/// 設定に応じたキャッシュバックエンドを作成
///
/// 有効期限はバックエンドによらず `ANALYZE_CACHE_TIMEOUT_SECS`。
pub async fn build_cache(config: &CacheConfig) -> InfraResult<Arc<dyn ResponseCache>> {
    let ttl = ANALYZE_CACHE_TIMEOUT_SECS;
    match &config.backend {
        CacheBackend::Memory => {
            tracing::info!("メモリキャッシュを使用します（TTL {}秒, 最大{}件）", ttl, MEMORY_CACHE_CAPACITY);
            Ok(Arc::new(MemoryResponseCache::new(ttl)))
        }
        CacheBackend::Null => {
            tracing::info!("キャッシュを無効にします");
            Ok(Arc::new(NullResponseCache))
        }
        CacheBackend::Redis { url } => {
            tracing::info!("Redisキャッシュを使用します: {}（TTL {}秒）", url, ttl);
            let cache = RedisResponseCache::connect(url, ttl).await?;
            Ok(Arc::new(cache))
        }
    }
}
