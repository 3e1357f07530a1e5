//! # Todo API 設定
//!
//! 環境変数から Todo API サーバーの設定を読み込む。
//!
//! 数値項目は未設定ならデフォルト値を使い、不正な値であれば起動を中断する。

use std::{collections::HashMap, env, str::FromStr, time::Duration};

use thiserror::Error;
use todo_infra::dynamodb;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 値が期待する形式ではない
    #[error("{name} の値が不正です: {value:?}（{reason}）")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// Todo API サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoApiConfig {
    /// バインドアドレス
    pub host:           String,
    /// ポート番号
    pub port:           u16,
    /// ドキュメントストアの設定
    pub store:          StoreConfig,
    /// シャットダウン時に処理中リクエストを待つ猶予
    pub shutdown_grace: Duration,
}

/// ドキュメントストア（DynamoDB）の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// エンドポイント URL（DynamoDB Local 使用時に設定、未設定で AWS デフォルト）
    pub endpoint:          Option<String>,
    /// AWS リージョン
    pub region:            String,
    /// データベース名（テーブル名の接頭辞）
    pub database_name:     String,
    /// コレクション名
    pub collection_name:   String,
    /// 起動時の接続確認の制限時間
    pub connect_timeout:   Duration,
    /// ストア操作 1 回あたりの制限時間
    pub operation_timeout: Duration,
}

impl StoreConfig {
    /// 実際に使用するテーブル名
    pub fn table_name(&self) -> String {
        dynamodb::table_name(&self.database_name, &self.collection_name)
    }
}

impl TodoApiConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の変数ソースから設定を読み込む
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let string_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host:           string_or("TODO_API_HOST", "0.0.0.0"),
            port:           parse_or(&lookup, "TODO_API_PORT", 9000)?,
            store:          StoreConfig {
                endpoint:          lookup("DYNAMODB_ENDPOINT").filter(|v| !v.is_empty()),
                region:            string_or("DYNAMODB_REGION", "ap-northeast-1"),
                database_name:     string_or("TODO_DATABASE_NAME", "demo_todo"),
                collection_name:   string_or("TODO_COLLECTION_NAME", "todo"),
                connect_timeout:   nonzero_secs_or(&lookup, "TODO_CONNECT_TIMEOUT_SECS", 10)?,
                operation_timeout: nonzero_secs_or(&lookup, "TODO_OPERATION_TIMEOUT_SECS", 5)?,
            },
            // 0 は猶予なし（シグナル受信後ただちに中断）として受け付ける
            shutdown_grace: secs_or(&lookup, "TODO_SHUTDOWN_GRACE_SECS", 5)?,
        })
    }
}

/// 変数をパースする。未設定ならデフォルト値を返す
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            })
        }
    }
}

/// 秒数の変数を `Duration` として読み込む
fn secs_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    parse_or(lookup, name, default).map(Duration::from_secs)
}

/// 0 を許さない秒数の変数を読み込む
///
/// 0 秒の制限時間ではストア操作が必ずタイムアウトする。
fn nonzero_secs_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let duration = secs_or(lookup, name, default)?;
    if duration.is_zero() {
        return Err(ConfigError::Invalid {
            name,
            value: lookup(name).unwrap_or_default(),
            reason: "1 以上を指定してください".to_string(),
        });
    }
    Ok(duration)
}
