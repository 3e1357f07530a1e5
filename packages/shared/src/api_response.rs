//! # API レスポンスエンベロープ
//!
//! 一覧系 API の統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// データを返す API の統一レスポンス型
///
/// 一覧取得エンドポイントは `{ "data": T }` 形式でレスポンスを返す。
///
/// ## 使用例
///
/// ```
/// use todo_shared::ApiResponse;
///
/// let response = ApiResponse::new(vec!["buy milk"]);
/// assert_eq!(response.data, vec!["buy milk"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
