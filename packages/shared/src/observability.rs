//! # ログ初期化
//!
//! tracing subscriber の組み立てと、リクエストスパンの生成を提供する。
//!
//! | 環境変数 | 既定値 | 内容 |
//! |----------|--------|------|
//! | `RUST_LOG` | `info,todo=debug` | フィルタ |
//! | `LOG_FORMAT` | `pretty` | `json` / `pretty` |

/// 既定のログフィルタ
pub const DEFAULT_FILTER: &str = "info,todo=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 イベント 1 行の JSON
    Json,
    /// 開発向けの整形出力
    #[default]
    Pretty,
}

impl LogFormat {
    /// `LOG_FORMAT` の値を解釈する
    ///
    /// 大文字小文字と前後の空白は無視する。未設定なら Pretty。
    /// 解釈できない値は Pretty とし、subscriber がまだ無いため stderr に警告する。
    pub fn from_value(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => {
                eprintln!("WARNING: LOG_FORMAT={raw:?} は不明な値のため pretty で出力します");
                Self::Pretty
            }
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// サービス名
    pub service_name: String,
    pub log_format:   LogFormat,
    /// `RUST_LOG` 未設定時に使うフィルタ
    pub filter:       String,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            filter: DEFAULT_FILTER.to_string(),
        }
    }

    /// 環境変数から設定を読み取る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let format = std::env::var("LOG_FORMAT").ok();
        Self::new(service_name, LogFormat::from_value(format.as_deref()))
    }
}

/// グローバル subscriber を登録する
///
/// `ErrorLayer` も登録するので、infra 層のエラーが捕捉する `SpanTrace` に
/// 発生時点のスパン階層が入る。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let output = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::debug!(
        service = %config.service_name,
        format = ?config.log_format,
        "トレーシングを初期化しました"
    );
}

/// `TraceLayer::make_span_with` 用のリクエストスパン
///
/// スパン内のログ（Canonical Log Line を含む）にメソッドと URI が付く。
#[cfg(feature = "observability")]
pub fn make_request_span<B>(request: &http::Request<B>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
    )
}
