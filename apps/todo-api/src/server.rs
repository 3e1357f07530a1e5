//! # サーバーのライフサイクル管理
//!
//! 起動時のストア接続、HTTP サーバーの起動、割り込みシグナルによる
//! グレースフルシャットダウンを担当する。
//!
//! ## シャットダウン手順
//!
//! 1. 割り込みシグナルを受信する
//! 2. キャンセルトークンを発火し、新規接続の受け付けを止める
//! 3. 処理中のリクエストを猶予時間まで待つ（超過したらタスクを中断する）
//! 4. ストアクライアントを解放する

use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{Context as _, anyhow};
use axum::Router;
use todo_domain::clock::SystemClock;
use todo_infra::{InfraError, dynamodb, repository::DynamoDbTodoRepository};
use tokio::{net::TcpListener, time::timeout};
use tokio_util::sync::CancellationToken;

use crate::{
    config::TodoApiConfig,
    handler::{HomeState, PageRenderer, TodoState},
    router::build_router,
    usecase::TodoUseCaseImpl,
};

/// ストアに接続し、割り込みシグナルを受けるまでサーバーを動かす
pub async fn run(config: TodoApiConfig) -> anyhow::Result<()> {
    let store = &config.store;
    let table_name = store.table_name();

    tracing::info!(table = %table_name, "ドキュメントストアに接続します");
    let connect = async {
        let client = dynamodb::create_client(store.endpoint.as_deref(), &store.region).await;
        dynamodb::ensure_todo_table(&client, &table_name).await?;
        Ok::<_, InfraError>(client)
    };
    let client = timeout(store.connect_timeout, connect)
        .await
        .map_err(|_| {
            anyhow!(
                "ドキュメントストアへの接続が {}ms 以内に完了しませんでした",
                store.connect_timeout.as_millis()
            )
        })?
        .context("ドキュメントストアへの接続に失敗しました")?;
    tracing::info!(table = %table_name, "ドキュメントストアに接続しました");

    let repository =
        DynamoDbTodoRepository::new(client.clone(), table_name, store.operation_timeout);
    let usecase = TodoUseCaseImpl::new(Arc::new(repository), Arc::new(SystemClock));
    let todo_state = Arc::new(TodoState { usecase });
    let home_state = Arc::new(HomeState {
        renderer: PageRenderer::new().context("テンプレートの読み込みに失敗しました")?,
    });
    let app = build_router(todo_state, home_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("{addr} へのバインドに失敗しました"))?;
    tracing::info!("Todo API サーバーが起動しました: {}", addr);

    serve_until(listener, app, interrupt_signal(), config.shutdown_grace).await?;

    drop(client);
    tracing::info!("ストアクライアントを解放しました");

    Ok(())
}

/// `shutdown_signal` が完了するまでサーバーを動かす
///
/// シグナル受信後は新規接続を止め、処理中のリクエストを `grace` まで待つ。
/// シグナルより先にサーバーが終了した場合はエラーを返す。
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    shutdown_signal: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let token = CancellationToken::new();
    let cancelled = token.clone().cancelled_owned();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(cancelled)
            .await
    });

    tokio::select! {
        () = shutdown_signal => {
            tracing::info!("シャットダウンシグナルを受信しました");
        }
        joined = &mut server => {
            return match joined {
                Ok(Ok(())) => Err(anyhow!("サーバーがシャットダウン前に終了しました")),
                Ok(Err(e)) => Err(e).context("サーバーが異常終了しました"),
                Err(e) => Err(e).context("サーバータスクが異常終了しました"),
            };
        }
    }

    token.cancel();

    match timeout(grace, &mut server).await {
        Ok(joined) => {
            joined
                .context("サーバータスクが異常終了しました")?
                .context("サーバーが異常終了しました")?;
            tracing::info!("処理中のリクエストをすべて完了しました");
        }
        Err(_) => {
            tracing::warn!(
                grace_ms = grace.as_millis() as u64,
                "猶予時間内にリクエストが完了しなかったため中断します"
            );
            server.abort();
            // 中断の完了を待ち、リスナーを確実に閉じる
            let _ = server.await;
        }
    }

    Ok(())
}

/// 割り込みシグナル（Ctrl-C）を待つ
///
/// ハンドラを登録できない環境では完了しない。
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("割り込みシグナルのハンドラを登録できません: {}", e);
        std::future::pending::<()>().await;
    }
}
