//! # テスト用モックリポジトリ
//!
//! ユースケース・ハンドラテストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! todo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use todo_domain::todo::{Todo, TodoChanges, TodoId};

use crate::{error::InfraError, repository::TodoRepository};

/// モックに注入する障害の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// ストアへの問い合わせ失敗
    Store,
    /// 操作のタイムアウト
    Timeout,
    /// 永続化データの変換失敗
    Decode,
}

impl MockFailure {
    fn to_error(self, operation: &str) -> InfraError {
        match self {
            Self::Store => InfraError::dynamo_db(format!("{operation} に失敗: connection refused")),
            Self::Timeout => InfraError::timeout(operation, Duration::from_secs(5)),
            Self::Decode => InfraError::decode("文字列属性 'title' が見つかりません"),
        }
    }
}

// ===== MockTodoRepository =====

#[derive(Clone, Default)]
pub struct MockTodoRepository {
    todos:   Arc<Mutex<Vec<Todo>>>,
    failure: Arc<Mutex<Option<MockFailure>>>,
}

impl MockTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// すべての操作が指定した障害で失敗するモックを作成する
    pub fn failing(failure: MockFailure) -> Self {
        let mock = Self::new();
        mock.fail_with(failure);
        mock
    }

    /// 以降の操作を指定した障害で失敗させる
    pub fn fail_with(&self, failure: MockFailure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    pub fn add_todo(&self, todo: Todo) {
        self.todos.lock().unwrap().push(todo);
    }

    /// 現在保持している Todo のスナップショット
    pub fn todos(&self) -> Vec<Todo> {
        self.todos.lock().unwrap().clone()
    }

    fn check(&self, operation: &str) -> Result<(), InfraError> {
        match *self.failure.lock().unwrap() {
            Some(failure) => Err(failure.to_error(operation)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        self.check("scan")?;
        Ok(self.todos())
    }

    async fn insert(&self, todo: &Todo) -> Result<(), InfraError> {
        self.check("put_item")?;
        let mut todos = self.todos.lock().unwrap();
        if todos.iter().any(|t| t.id() == todo.id()) {
            return Err(InfraError::conflict("Todo", todo.id().to_string()));
        }
        todos.push(todo.clone());
        Ok(())
    }

    async fn update(&self, id: &TodoId, changes: &TodoChanges) -> Result<(), InfraError> {
        self.check("update_item")?;
        let mut todos = self.todos.lock().unwrap();
        let index = todos
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| InfraError::not_found("Todo", id.to_string()))?;
        let current = todos.remove(index);
        todos.insert(index, current.with_changes(changes.clone()));
        Ok(())
    }

    async fn delete(&self, id: &TodoId) -> Result<(), InfraError> {
        self.check("delete_item")?;
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id() != id);
        if todos.len() == before {
            return Err(InfraError::not_found("Todo", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use todo_domain::todo::TodoTitle;

    use super::*;

    fn todo(title: &str) -> Todo {
        Todo::new(TodoId::new(), TodoTitle::new(title).unwrap(), Utc::now())
    }

    #[tokio::test]
    async fn test_update_は対象のみを書き換える() {
        let sut = MockTodoRepository::new();
        let first = todo("buy milk");
        let second = todo("walk");
        sut.add_todo(first.clone());
        sut.add_todo(second.clone());

        sut.update(
            first.id(),
            &TodoChanges {
                title:     TodoTitle::new("buy milk").unwrap(),
                completed: true,
            },
        )
        .await
        .unwrap();

        let todos = sut.todos();
        assert!(todos[0].completed());
        assert_eq!(todos[1], second);
    }

    #[tokio::test]
    async fn test_delete_存在しないidはnot_found() {
        let sut = MockTodoRepository::new();

        let result = sut.delete(&TodoId::new()).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failing_は全操作を失敗させる() {
        let sut = MockTodoRepository::failing(MockFailure::Decode);

        assert!(sut.find_all().await.unwrap_err().is_decode());
        assert!(sut.insert(&todo("x")).await.is_err());
    }
}
