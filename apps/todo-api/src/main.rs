//! # Todo API サーバー
//!
//! ## 起動方法
//!
//! ```bash
//! # DynamoDB Local を使う場合
//! DYNAMODB_ENDPOINT=http://localhost:18000 cargo run -p todo-api
//! ```
//!
//! 設定項目は [`todo_api::config`] を参照。

use anyhow::Context as _;
use todo_api::{config::TodoApiConfig, server};
use todo_shared::observability::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(TracingConfig::from_env("todo-api"));
    let _tracing_guard = tracing::info_span!("app", service = "todo-api").entered();

    let config = TodoApiConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Todo API サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    if let Err(e) = server::run(config).await {
        tracing::error!("Todo API サーバーが異常終了しました: {:#}", e);
        return Err(e);
    }

    tracing::info!("Todo API サーバーを停止しました");
    Ok(())
}
