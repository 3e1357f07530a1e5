//! # Todo インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **ドキュメントストア接続**: DynamoDB クライアントの作成とテーブル確認
//! - **リポジトリ実装**: Todo の永続化（挿入・全件取得・更新・削除）
//! - **永続化形式の変換**: DynamoDB アイテム ⇔ `Todo` エンティティ
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`dynamodb`] - DynamoDB 接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - `mock` - テスト用インメモリリポジトリ（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::time::Duration;
//!
//! use todo_infra::{dynamodb, repository::DynamoDbTodoRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = dynamodb::create_client(Some("http://localhost:18000"), "ap-northeast-1").await;
//!     dynamodb::ensure_todo_table(&client, "demo_todo.todo").await?;
//!
//!     let repository =
//!         DynamoDbTodoRepository::new(client, "demo_todo.todo".to_string(), Duration::from_secs(5));
//!     Ok(())
//! }
//! ```

pub mod dynamodb;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
