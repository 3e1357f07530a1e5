//! # Todo
//!
//! Todo 項目を表現するドメインモデル。
//!
//! ## 不変条件
//!
//! - `id` は作成時に一度だけ採番され、以後変更されない
//! - API 経由で作成・更新された `title` は空白のみにならない
//! - `created_at` は作成時に一度だけ設定される
//! - 変更可能なのは `title` と `completed` のみ（[`TodoChanges`] 経由）
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use todo_domain::todo::{Todo, TodoId, TodoTitle};
//!
//! let title = TodoTitle::new("buy milk")?;
//! let todo = Todo::new(TodoId::new(), title, chrono::Utc::now());
//!
//! assert_eq!(todo.title(), "buy milk");
//! assert!(!todo.completed());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};

use crate::DomainError;

define_uuid_id! {
    /// Todo の一意識別子
    pub struct TodoId;
}

// =========================================================================
// TodoTitle（タイトル）
// =========================================================================

/// Todo のタイトル（値オブジェクト）
///
/// 空白以外の文字を 1 文字以上含むことだけを保証する。
/// 前後の空白は判定にのみ使い、値そのものは入力どおりに保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoTitle(String);

impl TodoTitle {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(DomainError::Validation("title is required".to_string()));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TodoTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// Todo（エンティティ）
// =========================================================================

/// Todo エンティティ
///
/// 永続化済みのタイトルはストア側で検証されないため、
/// 復元時（[`Todo::from_db`]）は文字列のまま受け取る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id:         TodoId,
    title:      String,
    completed:  bool,
    created_at: DateTime<Utc>,
}

impl Todo {
    /// 新しい Todo を作成する
    ///
    /// `completed` は常に `false` で始まる。
    pub fn new(id: TodoId, title: TodoTitle, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into_string(),
            completed: false,
            created_at: now,
        }
    }

    /// データベースから Todo を復元する
    pub fn from_db(id: TodoId, title: String, completed: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            completed,
            created_at,
        }
    }

    /// 変更を適用した新しいインスタンスを返す
    ///
    /// `id` と `created_at` は引き継がれる。
    pub fn with_changes(self, changes: TodoChanges) -> Self {
        Self {
            title: changes.title.into_string(),
            completed: changes.completed,
            ..self
        }
    }

    pub fn id(&self) -> &TodoId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Todo の変更内容
///
/// 更新操作は `title` と `completed` の両方を上書きする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub title:     TodoTitle,
    pub completed: bool,
}
