//! # ランディングページ
//!
//! `GET /` で API の概要ページを返す。
//!
//! テンプレートは `include_str!` でバイナリに埋め込み、起動時に tera へ登録する。

use std::sync::Arc;

use axum::{extract::State, response::Html};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ApiError;

const HOME_TEMPLATE: &str = "home.html";

/// ランディングページの共有状態
pub struct HomeState {
    pub renderer: PageRenderer,
}

/// ページに一覧表示するエンドポイント
#[derive(Debug, Serialize)]
struct Endpoint {
    method:      &'static str,
    path:        &'static str,
    description: &'static str,
}

const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method:      "GET",
        path:        "/todo/",
        description: "list every todo",
    },
    Endpoint {
        method:      "POST",
        path:        "/todo/",
        description: "create a todo",
    },
    Endpoint {
        method:      "PUT",
        path:        "/todo/{id}",
        description: "update title and completed",
    },
    Endpoint {
        method:      "DELETE",
        path:        "/todo/{id}",
        description: "delete a todo",
    },
];

/// ページレンダラー
///
/// tera テンプレートエンジンをラップする。
pub struct PageRenderer {
    engine: Tera,
}

impl PageRenderer {
    /// 埋め込みテンプレートを登録したレンダラーを作成する
    pub fn new() -> Result<Self, tera::Error> {
        let mut engine = Tera::default();
        engine.add_raw_template(HOME_TEMPLATE, include_str!("../../templates/home.html"))?;

        Ok(Self { engine })
    }

    /// ランディングページを描画する
    pub fn render_home(&self) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("service_name", "Todo API");
        context.insert("endpoints", ENDPOINTS);

        self.engine.render(HOME_TEMPLATE, &context)
    }
}

/// GET /
#[tracing::instrument(skip_all)]
pub async fn home(State(state): State<Arc<HomeState>>) -> Result<Html<String>, ApiError> {
    let page = state.renderer.render_home()?;
    Ok(Html(page))
}
