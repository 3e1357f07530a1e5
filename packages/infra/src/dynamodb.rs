//! # DynamoDB 接続管理
//!
//! Todo を格納するドキュメントストアとして Amazon DynamoDB を使用する。
//!
//! ## 設計方針
//!
//! - **ローカル開発**: DynamoDB Local を使用（エンドポイントを明示）
//! - **本番環境**: エンドポイント未指定時は AWS のデフォルト認証チェーンで接続
//! - **テーブル自動作成**: 起動時にテーブルが存在しなければ作成（冪等）
//!
//! ## テーブル名
//!
//! データベース名とコレクション名を `.` で連結したものをテーブル名とする
//! （例: `demo_todo.todo`）。

use aws_sdk_dynamodb::{
    Client,
    error::DisplayErrorContext,
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
};

use crate::InfraError;

/// Todo テーブルのパーティションキー属性名
pub const TODO_PARTITION_KEY: &str = "_id";

/// データベース名とコレクション名からテーブル名を組み立てる
pub fn table_name(database: &str, collection: &str) -> String {
    format!("{database}.{collection}")
}

/// DynamoDB クライアントを作成する
///
/// # 引数
///
/// * `endpoint` - DynamoDB エンドポイント URL（例: `http://localhost:18000`）。
///   指定時は DynamoDB Local とみなし、ダミーの認証情報を使用する
/// * `region` - AWS リージョン
pub async fn create_client(endpoint: Option<&str>, region: &str) -> Client {
    let loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_owned()));

    let loader = match endpoint {
        Some(endpoint) => loader
            .endpoint_url(endpoint)
            // DynamoDB Local はクレデンシャルを検証しないが、SDK はプロバイダが必要
            .credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                "local", "local", None, None, "local",
            )),
        None => loader,
    };

    Client::new(&loader.load().await)
}

/// Todo テーブルが存在しなければ作成する（冪等）
///
/// キーは `_id`（文字列）のみ。`describe_table` の往復が起動時の接続確認を兼ねる。
pub async fn ensure_todo_table(client: &Client, table_name: &str) -> Result<(), InfraError> {
    let described = client.describe_table().table_name(table_name).send().await;
    match described {
        Ok(_) => {
            tracing::debug!(table = table_name, "テーブルは作成済みです");
            Ok(())
        }
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception()) =>
        {
            create_todo_table(client, table_name).await
        }
        Err(err) => Err(InfraError::dynamo_db(format!(
            "テーブル '{table_name}' を確認できません: {}",
            DisplayErrorContext(&err)
        ))),
    }
}

async fn create_todo_table(client: &Client, table_name: &str) -> Result<(), InfraError> {
    let key = KeySchemaElement::builder()
        .attribute_name(TODO_PARTITION_KEY)
        .key_type(KeyType::Hash)
        .build()
        .map_err(|e| InfraError::unexpected(format!("キースキーマを構築できません: {e}")))?;
    let attribute = AttributeDefinition::builder()
        .attribute_name(TODO_PARTITION_KEY)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| InfraError::unexpected(format!("属性定義を構築できません: {e}")))?;

    tracing::info!(table = table_name, "テーブルを作成します");
    let created = client
        .create_table()
        .table_name(table_name)
        .key_schema(key)
        .attribute_definitions(attribute)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match created {
        Ok(_) => Ok(()),
        // 別プロセスが同時に作成している
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_resource_in_use_exception()) =>
        {
            tracing::debug!(table = table_name, "テーブルは他で作成中です");
            Ok(())
        }
        Err(err) => Err(InfraError::dynamo_db(format!(
            "テーブル '{table_name}' を作成できません: {}",
            DisplayErrorContext(&err)
        ))),
    }
}
