//! Todo ユースケース

use std::sync::Arc;

use todo_domain::{
    clock::Clock,
    todo::{Todo, TodoChanges, TodoId, TodoTitle},
};
use todo_infra::repository::TodoRepository;

use crate::error::ApiError;

/// Todo ユースケース
pub struct TodoUseCaseImpl {
    repository: Arc<dyn TodoRepository>,
    clock:      Arc<dyn Clock>,
}

impl TodoUseCaseImpl {
    pub fn new(repository: Arc<dyn TodoRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// 全 Todo を取得する
    ///
    /// 永続化データの変換に失敗した場合は問い合わせ失敗と区別して返す。
    pub async fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.repository.find_all().await.map_err(|e| {
            let message = if e.is_decode() {
                "could not decode todos"
            } else {
                "could not fetch todos"
            };
            ApiError::from_infra(message, e)
        })
    }

    /// Todo を作成する
    ///
    /// ID と作成日時はサーバー側で採番する。`completed` は常に `false`。
    pub async fn create_todo(&self, title: TodoTitle) -> Result<Todo, ApiError> {
        let todo = Todo::new(TodoId::new(), title, self.clock.now());

        self.repository
            .insert(&todo)
            .await
            .map_err(|e| ApiError::from_infra("could not create todo", e))?;

        tracing::info!(todo_id = %todo.id(), "Todo を作成しました");
        Ok(todo)
    }

    /// Todo のタイトルと完了フラグを更新する
    pub async fn update_todo(&self, id: TodoId, changes: TodoChanges) -> Result<(), ApiError> {
        self.repository
            .update(&id, &changes)
            .await
            .map_err(|e| ApiError::from_infra("could not update todo", e))?;

        tracing::info!(todo_id = %id, completed = changes.completed, "Todo を更新しました");
        Ok(())
    }

    /// Todo を削除する
    pub async fn delete_todo(&self, id: TodoId) -> Result<(), ApiError> {
        self.repository
            .delete(&id)
            .await
            .map_err(|e| ApiError::from_infra("could not delete todo", e))?;

        tracing::info!(todo_id = %id, "Todo を削除しました");
        Ok(())
    }
}
