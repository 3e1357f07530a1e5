//! # TodoRepository
//!
//! Todo の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **1 Todo = 1 アイテム**: PK = `_id`（Todo ID の文字列表現）
//! - **全件取得**: `Scan` を `LastEvaluatedKey` が尽きるまで繰り返す（順序は不定）
//! - **存在条件付き書き込み**: 更新・削除は `attribute_exists(_id)` を条件とし、
//!   対象が無ければ NotFound を返す
//! - **タイムアウト**: 各操作は `operation_timeout` で打ち切る。リトライはしない
//!
//! ## 永続化形式
//!
//! | 属性 | 型 | 内容 |
//! |------|----|------|
//! | `_id` | S | Todo ID |
//! | `title` | S | タイトル |
//! | `completed` | BOOL | 完了フラグ |
//! | `createAt` | S | 作成日時（RFC 3339） |

use std::{collections::HashMap, future::Future, time::Duration};

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, error::DisplayErrorContext, types::AttributeValue};
use chrono::{DateTime, Utc};
use todo_domain::todo::{Todo, TodoChanges, TodoId};

use crate::{InfraError, dynamodb::TODO_PARTITION_KEY};

const ENTITY: &str = "Todo";

const ATTR_TITLE: &str = "title";
const ATTR_COMPLETED: &str = "completed";
const ATTR_CREATED_AT: &str = "createAt";

/// Todo リポジトリトレイト
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// 全 Todo を取得する（順序は保証しない）
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError>;

    /// Todo を挿入する
    ///
    /// 同じ ID のアイテムが既に存在する場合は Conflict を返す。
    async fn insert(&self, todo: &Todo) -> Result<(), InfraError>;

    /// `title` と `completed` を上書きする
    ///
    /// 対象が存在しない場合は NotFound を返す。
    async fn update(&self, id: &TodoId, changes: &TodoChanges) -> Result<(), InfraError>;

    /// Todo を削除する
    ///
    /// 対象が存在しない場合は NotFound を返す。
    async fn delete(&self, id: &TodoId) -> Result<(), InfraError>;
}

/// DynamoDB 実装の TodoRepository
#[derive(Debug, Clone)]
pub struct DynamoDbTodoRepository {
    client:            Client,
    table_name:        String,
    operation_timeout: Duration,
}

impl DynamoDbTodoRepository {
    pub fn new(client: Client, table_name: String, operation_timeout: Duration) -> Self {
        Self {
            client,
            table_name,
            operation_timeout,
        }
    }

    /// 操作を `operation_timeout` で打ち切る
    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, InfraError>>,
    ) -> Result<T, InfraError> {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(InfraError::timeout(operation, self.operation_timeout)),
        }
    }

    async fn scan_all(&self) -> Result<Vec<Todo>, InfraError> {
        let mut todos = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| {
                    InfraError::dynamo_db(format!("Todo の取得に失敗: {}", DisplayErrorContext(&e)))
                })?;

            for item in output.items() {
                todos.push(item_to_todo(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(todos)
    }
}

#[async_trait]
impl TodoRepository for DynamoDbTodoRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        self.bounded("scan", self.scan_all()).await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %todo.id()))]
    async fn insert(&self, todo: &Todo) -> Result<(), InfraError> {
        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(todo_to_item(todo)))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", TODO_PARTITION_KEY);

        self.bounded("put_item", async move {
            request.send().await.map_err(|e| {
                let is_duplicate = e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception());
                if is_duplicate {
                    InfraError::conflict(ENTITY, todo.id().to_string())
                } else {
                    InfraError::dynamo_db(format!("Todo の登録に失敗: {}", DisplayErrorContext(&e)))
                }
            })
        })
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %id))]
    async fn update(&self, id: &TodoId, changes: &TodoChanges) -> Result<(), InfraError> {
        let request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(TODO_PARTITION_KEY, AttributeValue::S(id.to_string()))
            .update_expression("SET #title = :title, #completed = :completed")
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", TODO_PARTITION_KEY)
            .expression_attribute_names("#title", ATTR_TITLE)
            .expression_attribute_names("#completed", ATTR_COMPLETED)
            .expression_attribute_values(
                ":title",
                AttributeValue::S(changes.title.as_str().to_owned()),
            )
            .expression_attribute_values(":completed", AttributeValue::Bool(changes.completed));

        self.bounded("update_item", async move {
            request.send().await.map_err(|e| {
                let is_missing = e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception());
                if is_missing {
                    InfraError::not_found(ENTITY, id.to_string())
                } else {
                    InfraError::dynamo_db(format!("Todo の更新に失敗: {}", DisplayErrorContext(&e)))
                }
            })
        })
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %id))]
    async fn delete(&self, id: &TodoId) -> Result<(), InfraError> {
        let request = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(TODO_PARTITION_KEY, AttributeValue::S(id.to_string()))
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", TODO_PARTITION_KEY);

        self.bounded("delete_item", async move {
            request.send().await.map_err(|e| {
                let is_missing = e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception());
                if is_missing {
                    InfraError::not_found(ENTITY, id.to_string())
                } else {
                    InfraError::dynamo_db(format!("Todo の削除に失敗: {}", DisplayErrorContext(&e)))
                }
            })
        })
        .await?;

        Ok(())
    }
}

// ===== 永続化形式との変換 =====

/// Todo を DynamoDB アイテムに変換する
fn todo_to_item(todo: &Todo) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            TODO_PARTITION_KEY.to_string(),
            AttributeValue::S(todo.id().to_string()),
        ),
        (
            ATTR_TITLE.to_string(),
            AttributeValue::S(todo.title().to_owned()),
        ),
        (
            ATTR_COMPLETED.to_string(),
            AttributeValue::Bool(todo.completed()),
        ),
        (
            ATTR_CREATED_AT.to_string(),
            AttributeValue::S(todo.created_at().to_rfc3339()),
        ),
    ])
}

/// DynamoDB アイテムを Todo に変換する
///
/// 属性の欠落や型の不一致はデコードエラーとする。
fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<Todo, InfraError> {
    let id_str = get_s(item, TODO_PARTITION_KEY)?;
    let title = get_s(item, ATTR_TITLE)?;
    let completed = get_bool(item, ATTR_COMPLETED)?;
    let created_at_str = get_s(item, ATTR_CREATED_AT)?;

    let id = TodoId::parse(&id_str)
        .map_err(|e| InfraError::decode(format!("{TODO_PARTITION_KEY} のパースに失敗: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| InfraError::decode(format!("{ATTR_CREATED_AT} のパースに失敗: {e}")))?
        .with_timezone(&Utc);

    Ok(Todo::from_db(id, title, completed, created_at))
}

/// DynamoDB アイテムから文字列属性を取得する
fn get_s(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, InfraError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| InfraError::decode(format!("文字列属性 '{key}' が見つかりません")))
}

/// DynamoDB アイテムから真偽値属性を取得する
fn get_bool(item: &HashMap<String, AttributeValue>, key: &str) -> Result<bool, InfraError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| InfraError::decode(format!("真偽値属性 '{key}' が見つかりません")))
}
