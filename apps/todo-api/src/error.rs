//! # Todo API エラー定義
//!
//! Todo API 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! すべてのエラーは `{ "message": ..., "error": ... }` 形式で返す。
//!
//! | エラー種別 | HTTP ステータス |
//! |-----------|----------------|
//! | `InvalidRequest` | 400 Bad Request |
//! | `TitleRequired` | 400 Bad Request |
//! | `InvalidId` | 400 Bad Request |
//! | `NotFound` | 404 Not Found |
//! | `Store` | 503 Service Unavailable（デコード失敗は 500） |
//! | `Render` | 500 Internal Server Error |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_infra::InfraError;
use todo_shared::ErrorResponse;

/// Todo API で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// リクエストボディが JSON として不正、または期待する形ではない
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// タイトルが未指定または空白のみ
    #[error("title is required")]
    TitleRequired,

    /// パスの ID が不正な形式
    #[error("invalid id")]
    InvalidId,

    /// 更新・削除の対象が存在しない
    #[error("{message}: {source}")]
    NotFound {
        message: &'static str,
        source:  InfraError,
    },

    /// ストア操作の失敗（タイムアウト・デコード失敗を含む）
    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        source:  InfraError,
    },

    /// ランディングページの描画失敗
    #[error("could not render page: {0}")]
    Render(#[from] tera::Error),
}

impl ApiError {
    /// インフラエラーを操作ごとのメッセージ付きで変換する
    ///
    /// 対象なしは `NotFound`、それ以外は `Store` になる。
    pub fn from_infra(message: &'static str, source: InfraError) -> Self {
        if source.is_not_found() {
            Self::NotFound { message, source }
        } else {
            Self::Store { message, source }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::TitleRequired | Self::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store { source, .. } if source.is_decode() => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::InvalidRequest(detail) => ErrorResponse::new("invalid request", detail),
            ApiError::TitleRequired => ErrorResponse::bad_request("title is required"),
            ApiError::InvalidId => ErrorResponse::bad_request("invalid id"),
            ApiError::NotFound { message, source } => {
                tracing::debug!(error = %source, "{}", message);
                ErrorResponse::new(message, source.to_string())
            }
            ApiError::Store { message, source } => {
                tracing::error!(
                    error = %source,
                    span_trace = %source.span_trace(),
                    "{}",
                    message
                );
                ErrorResponse::new(message, source.to_string())
            }
            ApiError::Render(e) => {
                tracing::error!("テンプレートの描画に失敗: {}", e);
                ErrorResponse::new("could not render page", e.to_string())
            }
        };

        (status, Json(body)).into_response()
    }
}
