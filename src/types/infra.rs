use crate::types::ConfigError;
use thiserror::Error;

/// インフラストラクチャ層のエラー型
/// データベース、キャッシュ、ファイルシステム、画像処理など基盤的なエラーを定義
#[derive(Error, Debug)]
pub enum InfraError {
    /// ファイルシステムエラー
    #[error("ファイルシステムエラー: {path} - {source}")]
    FileSystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// データベース接続エラー
    #[error("データベース接続エラー: {source}")]
    DatabaseConnection {
        #[source]
        source: sqlx::Error,
    },

    /// データベースクエリエラー
    #[error("データベースクエリエラー: {operation} - {source}")]
    DatabaseQuery {
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    /// キャッシュバックエンドのエラー
    #[error("キャッシュエラー: {operation} - {source}")]
    Cache {
        operation: String,
        #[source]
        source: redis::RedisError,
    },

    /// 画像のエンコード・フォント読み込みエラー
    #[error("画像処理エラー: {context}")]
    Image { context: String },

    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl InfraError {
    /// ファイルシステムエラーを作成
    pub fn file_system<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// データベース接続エラーを作成
    pub fn database_connection(source: sqlx::Error) -> Self {
        Self::DatabaseConnection { source }
    }

    /// データベースクエリエラーを作成
    pub fn database_query<O: Into<String>>(operation: O, source: sqlx::Error) -> Self {
        Self::DatabaseQuery {
            operation: operation.into(),
            source,
        }
    }

    /// キャッシュエラーを作成
    pub fn cache<O: Into<String>>(operation: O, source: redis::RedisError) -> Self {
        Self::Cache {
            operation: operation.into(),
            source,
        }
    }

    /// 画像処理エラーを作成
    pub fn image<C: Into<String>>(context: C) -> Self {
        Self::Image {
            context: context.into(),
        }
    }
}

/// インフラエラーのResult型エイリアス
pub type InfraResult<T> = std::result::Result<T, InfraError>;

/// データベースインサート操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResult {
    /// 新規挿入された件数
    pub inserted: usize,
}

impl InsertResult {
    pub fn new(inserted: usize) -> Self {
        Self { inserted }
    }

    /// 空の結果を作成
    pub fn empty() -> Self {
        Self::new(0)
    }
}

impl Default for InsertResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for InsertResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "処理完了: 新規保存{}件", self.inserted)
    }
}
