//! # ルーター構築
//!
//! ハンドラをパスに束ね、リクエストログ用のミドルウェアを適用する。
//!
//! `/todo` と `/todo/` はどちらも一覧・作成として扱う。

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
};
use todo_shared::{canonical_log::CanonicalLogLineLayer, observability::make_request_span};
use tower_http::trace::TraceLayer;

use crate::handler::{
    HomeState,
    TodoState,
    create_todo,
    delete_todo,
    home,
    list_todos,
    update_todo,
};

/// Todo エンドポイントのルーター
pub fn todo_router(state: Arc<TodoState>) -> Router {
    Router::new()
        .route("/todo", get(list_todos).post(create_todo))
        .route("/todo/", get(list_todos).post(create_todo))
        .route("/todo/{id}", put(update_todo).delete(delete_todo))
        .with_state(state)
}

/// アプリケーション全体のルーターを構築する
///
/// CanonicalLogLineLayer は TraceLayer のスパン内で動作させる。
pub fn build_router(todo_state: Arc<TodoState>, home_state: Arc<HomeState>) -> Router {
    Router::new()
        .route("/", get(home))
        .with_state(home_state)
        .merge(todo_router(todo_state))
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
}
