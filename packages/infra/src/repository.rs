//! # リポジトリ実装
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイト経由でのみ永続化にアクセスする
//! - **ストア抽象化**: DynamoDB 固有の処理（式、属性型、ページング）をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod todo_repository;

pub use todo_repository::{DynamoDbTodoRepository, TodoRepository};
