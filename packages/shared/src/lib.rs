//! # Todo API 共有ユーティリティ
//!
//! このクレートは、Todo API プロジェクト全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, api）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（axum 依存は入れない）
//!
//! ## モジュール構成
//!
//! - [`api_response`] - `{ "data": T }` エンベロープ
//! - [`message_response`] - `{ "message": ... }` 系のエンベロープ
//! - [`error_response`] - `{ "message", "error" }` エラーエンベロープ
//! - [`observability`] - トレーシング初期化（`observability` feature）
//! - [`canonical_log`] - リクエストログミドルウェア（`observability` feature）

pub mod api_response;
#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod error_response;
pub mod message_response;
pub mod observability;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
pub use message_response::{CreatedResponse, MessageResponse};
