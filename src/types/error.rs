use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// HTTPハンドラーが返すエラー型
/// 利用者側の入力不備(400)と、それ以外の処理失敗(500)を区別する
#[derive(Error, Debug)]
pub enum AppError {
    /// リクエストパラメータの不備
    #[error("{message}")]
    BadRequest { message: String },

    /// 永続化・描画など内部処理の失敗
    #[error("内部エラー: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// 入力不備エラーを作成
    pub fn bad_request<M: Into<String>>(message: M) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::BadRequest { message } => message.clone(),
            Self::Internal(e) => {
                tracing::error!(error = %format!("{:#}", e), "リクエスト処理に失敗");
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// ハンドラー用のResult型エイリアス
pub type AppResult<T> = std::result::Result<T, AppError>;
