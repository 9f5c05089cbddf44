use crate::types::{ConfigError, ConfigResult};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// 既定のReddit認証エンドポイント
pub const DEFAULT_REDDIT_AUTH_BASE_URL: &str = "https://www.reddit.com";
/// 既定のReddit APIエンドポイント
pub const DEFAULT_REDDIT_API_BASE_URL: &str = "https://oauth.reddit.com";

/// キャッシュバックエンドの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// プロセス内メモリ
    Memory,
    /// キャッシュしない
    Null,
    /// Redis（接続URL付き）
    Redis { url: String },
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
}

/// Reddit APIの認証情報とエンドポイント
#[derive(Debug, Clone, Default)]
pub struct RedditConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: Option<String>,
    pub auth_base_url: String,
    pub api_base_url: String,
}

/// アプリケーション全体の設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub cache: CacheConfig,
    pub reddit: RedditConfig,
    /// /static で公開するディレクトリ
    pub static_dir: PathBuf,
    /// グラフ画像の出力先
    pub images_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    /// `.env`の読み込みは呼び出し側（main）で済ませておくこと
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意のキー検索関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 空文字は未設定として扱う
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url =
            get("DATABASE_URL").ok_or_else(|| ConfigError::missing_env_var("DATABASE_URL"))?;

        let backend = parse_cache_backend(
            get("CACHE_TYPE").as_deref(),
            get("CACHE_REDIS_URL").as_deref(),
            get("CACHE_REDIS_PORT").as_deref(),
        )?;

        let reddit = RedditConfig {
            client_id: get("REDDIT_CLIENT_ID"),
            client_secret: get("REDDIT_CLIENT_SECRET"),
            user_agent: get("REDDIT_USER_AGENT"),
            auth_base_url: get("REDDIT_AUTH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_REDDIT_AUTH_BASE_URL.to_string()),
            api_base_url: get("REDDIT_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_REDDIT_API_BASE_URL.to_string()),
        };

        let static_dir = PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "static".into()));
        let images_dir = get("IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| static_dir.join("images"));

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => 8080,
        };
        let bind_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| ConfigError::invalid_value("HOST", host.clone(), "IPアドレスではありません"))?;

        Ok(Self {
            database_url,
            cache: CacheConfig { backend },
            reddit,
            static_dir,
            images_dir,
            bind_addr,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> ConfigResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid_value(name, raw, "数値ではありません"))
}

/// CACHE_TYPEとRedis接続情報からバックエンドを決定する
fn parse_cache_backend(
    cache_type: Option<&str>,
    redis_url: Option<&str>,
    redis_port: Option<&str>,
) -> ConfigResult<CacheBackend> {
    let kind = cache_type.unwrap_or("memory").to_ascii_lowercase();

    match kind.as_str() {
        "memory" | "simple" | "simplecache" => Ok(CacheBackend::Memory),
        "null" | "nullcache" => Ok(CacheBackend::Null),
        "redis" | "rediscache" => {
            let raw_url = redis_url.unwrap_or("redis://127.0.0.1/");
            let mut url = Url::parse(raw_url)
                .map_err(|e| ConfigError::invalid_value("CACHE_REDIS_URL", raw_url, e.to_string()))?;

            // URLにポートが無い場合のみCACHE_REDIS_PORTを適用
            if let Some(port) = redis_port {
                let port = parse_number::<u16>("CACHE_REDIS_PORT", port)?;
                if url.port().is_none() {
                    url.set_port(Some(port)).map_err(|_| {
                        ConfigError::invalid_value("CACHE_REDIS_URL", raw_url, "ポートを設定できません")
                    })?;
                }
            }

            Ok(CacheBackend::Redis {
                url: url.to_string(),
            })
        }
        other => Err(ConfigError::invalid_value(
            "CACHE_TYPE",
            other,
            "memory または redis を指定してください",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/test")]))
                .unwrap();

        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.images_dir, PathBuf::from("static/images"));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.reddit.api_base_url, DEFAULT_REDDIT_API_BASE_URL);
        assert!(config.reddit.client_id.is_none());
    }

    #[test]
    fn test_images_dir_follows_static_dir() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/test"),
            ("STATIC_DIR", "/srv/public"),
        ]))
        .unwrap();
        assert_eq!(config.images_dir, PathBuf::from("/srv/public/images"));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/test"),
            ("IMAGES_DIR", "/tmp/charts"),
        ]))
        .unwrap();
        assert_eq!(config.images_dir, PathBuf::from("/tmp/charts"));
    }

    #[test]
    fn test_missing_database_url() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvironmentVariable { ref name } if name == "DATABASE_URL"));
    }

    #[test]
    fn test_redis_backend_with_port() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/test"),
            ("CACHE_TYPE", "RedisCache"),
            ("CACHE_REDIS_URL", "redis://cache.internal"),
            ("CACHE_REDIS_PORT", "6380"),
        ]))
        .unwrap();

        match config.cache.backend {
            CacheBackend::Redis { url } => assert!(url.contains("cache.internal:6380"), "{}", url),
            other => panic!("Redisになるべき: {:?}", other),
        }
    }

    #[test]
    fn test_redis_url_port_takes_precedence() {
        let backend =
            parse_cache_backend(Some("redis"), Some("redis://localhost:6379/0"), Some("7000"))
                .unwrap();
        assert_eq!(
            backend,
            CacheBackend::Redis {
                url: "redis://localhost:6379/0".to_string()
            }
        );
    }

    #[test]
    fn test_cache_default_timeout_is_not_read() {
        // 分析ページの有効期限は固定のため、CACHE_DEFAULT_TIMEOUTは設定に影響しない
        for raw in ["120", "一時間"] {
            let config = AppConfig::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://localhost/test"),
                ("CACHE_DEFAULT_TIMEOUT", raw),
            ]))
            .unwrap();
            assert_eq!(config.cache.backend, CacheBackend::Memory);
        }
    }

    #[test]
    fn test_null_cache_type() {
        for kind in ["null", "NullCache"] {
            let backend = parse_cache_backend(Some(kind), None, None).unwrap();
            assert_eq!(backend, CacheBackend::Null, "{}", kind);
        }
        assert_eq!(
            parse_cache_backend(Some("SimpleCache"), None, None).unwrap(),
            CacheBackend::Memory
        );
    }

    #[test]
    fn test_invalid_values() {
        let bad_port = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/test"),
            ("PORT", "八千"),
        ]));
        assert!(matches!(bad_port, Err(ConfigError::InvalidValue { .. })));

        let bad_type = parse_cache_backend(Some("memcached"), None, None);
        assert!(bad_type.is_err());
    }
}
