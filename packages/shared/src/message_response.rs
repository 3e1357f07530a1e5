//! # メッセージレスポンス
//!
//! 更新系 API が返す `{ "message": ... }` 形式のエンベロープ。

use serde::Serialize;

/// 処理結果のメッセージのみを返すレスポンス
///
/// 更新・削除の成功時に使用する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 作成成功レスポンス
///
/// メッセージに加えて、採番された ID を `todo_id` として返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub todo_id: String,
}

impl CreatedResponse {
    pub fn new(message: impl Into<String>, todo_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            todo_id: todo_id.into(),
        }
    }
}
