//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ロジックはユースケースに委譲

pub mod home;
pub mod todo;

pub use home::{HomeState, PageRenderer, home};
pub use todo::{TodoState, TodoView, create_todo, delete_todo, list_todos, update_todo};
