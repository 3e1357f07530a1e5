//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーエンベロープ `{ "message", "error" }` を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換は API 層の責務（shared に axum 依存を入れない）
//! - HTTP ステータスはボディに含めず、ステータスラインでのみ表現する
//! - `message` は操作の失敗を表す固定文言、`error` は原因の詳細

use serde::{Deserialize, Serialize};

/// 入力不正時に `error` へ入れる固定値
const BAD_REQUEST: &str = "bad request";

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error:   String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    pub fn new(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error:   error.into(),
        }
    }

    /// 原因の詳細を持たない入力エラー
    ///
    /// `error` には `"bad request"` が入る。
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, BAD_REQUEST)
    }
}
