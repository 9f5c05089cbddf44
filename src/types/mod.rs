//! 型定義モジュール
//!
//! アプリケーション全体で使用される共通的な型定義を管理します。
//! - 設定エラー: 環境変数の欠落・不正値
//! - インフラエラー: DB・キャッシュ・ファイル・画像処理
//! - HTTPエラー: ハンドラーからのレスポンス変換

pub mod config;
pub mod error;
pub mod infra;

// 便利な再エクスポート
pub use config::{ConfigError, ConfigResult};
pub use error::{AppError, AppResult};
pub use infra::{InfraError, InfraResult, InsertResult};
