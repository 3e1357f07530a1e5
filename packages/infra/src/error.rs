//! # インフラ層エラー
//!
//! ストア操作の失敗を [`InfraErrorKind`] で分類し、生成時点の
//! [`SpanTrace`] と一緒に [`InfraError`] として返す。
//!
//! API 層は種別を見て HTTP ステータスを決める。
//!
//! | 種別 | 発生箇所 |
//! |------|----------|
//! | `DynamoDb` | SDK 呼び出しの失敗 |
//! | `NotFound` | 存在条件付き更新・削除で対象が無い |
//! | `Conflict` | 挿入時に同じ ID が既にある |
//! | `Timeout` | `operation_timeout` を超えた |
//! | `Decode` | アイテムの属性欠落・型不一致 |
//! | `Unexpected` | SDK のビルダー構築失敗など |

use std::time::Duration;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// `SpanTrace` は `ErrorLayer` が登録されている場合にだけ中身を持つ。
#[derive(Debug, Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// AWS SDK のエラー
    ///
    /// SDK のエラー型は操作ごとに異なるため、文字列にして保持する。
    #[error("DynamoDB エラー: {0}")]
    DynamoDb(String),

    #[error("{entity} が見つかりません: {id}")]
    NotFound { entity: String, id: String },

    #[error("競合が発生しました: {entity}(id={id})")]
    Conflict { entity: String, id: String },

    #[error("{operation} がタイムアウトしました（{timeout_ms}ms）")]
    Timeout {
        operation:  String,
        timeout_ms: u64,
    },

    #[error("デコードエラー: {0}")]
    Decode(String),

    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<InfraErrorKind> for InfraError {
    fn from(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl InfraError {
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 更新・削除の対象が無かった
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, InfraErrorKind::NotFound { .. })
    }

    /// 保存済みのアイテムをエンティティに戻せなかった
    pub fn is_decode(&self) -> bool {
        matches!(self.kind, InfraErrorKind::Decode(_))
    }

    pub fn dynamo_db(msg: impl Into<String>) -> Self {
        InfraErrorKind::DynamoDb(msg.into()).into()
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        InfraErrorKind::NotFound {
            entity: entity.into(),
            id:     id.into(),
        }
        .into()
    }

    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        InfraErrorKind::Conflict {
            entity: entity.into(),
            id:     id.into(),
        }
        .into()
    }

    /// `limit` はミリ秒に丸めて保持する
    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        InfraErrorKind::Timeout {
            operation:  operation.into(),
            timeout_ms: limit.as_millis() as u64,
        }
        .into()
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        InfraErrorKind::Decode(msg.into()).into()
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        InfraErrorKind::Unexpected(msg.into()).into()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    #[rstest]
    #[case(InfraError::not_found("Todo", "T-001"), "Todo が見つかりません: T-001")]
    #[case(InfraError::conflict("Todo", "T-002"), "競合が発生しました: Todo(id=T-002)")]
    #[case(
        InfraError::timeout("put_item", Duration::from_millis(250)),
        "put_item がタイムアウトしました（250ms）"
    )]
    #[case(InfraError::decode("broken"), "デコードエラー: broken")]
    #[case(InfraError::dynamo_db("接続失敗"), "DynamoDB エラー: 接続失敗")]
    fn test_displayは種別のメッセージになる(#[case] error: InfraError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_判定メソッドは種別にだけ反応する() {
        let not_found = InfraError::not_found("Todo", "T-001");
        let decode = InfraError::decode("属性 'title' が見つかりません");
        let timeout = InfraError::timeout("scan", Duration::from_secs(5));

        assert!(not_found.is_not_found() && !not_found.is_decode());
        assert!(decode.is_decode() && !decode.is_not_found());
        assert!(!timeout.is_not_found() && !timeout.is_decode());
        assert!(matches!(
            timeout.kind(),
            InfraErrorKind::Timeout { timeout_ms: 5000, .. }
        ));
    }

    #[test]
    fn test_生成時のスパンがspan_traceに残る() {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        let span = tracing::info_span!("delete_todo");
        let _enter = span.enter();

        let error = InfraError::not_found("Todo", "T-001");

        let trace = error.span_trace().to_string();
        assert!(trace.contains("delete_todo"), "SpanTrace: {trace}");
    }
}
