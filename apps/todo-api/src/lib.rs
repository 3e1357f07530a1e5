//! # Todo API
//!
//! Todo の一覧・作成・更新・削除を提供する HTTP サービス。
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - API エラーと HTTP レスポンスへの変換
//! - [`handler`] - HTTP ハンドラ
//! - [`router`] - ルーター構築とミドルウェア
//! - [`server`] - 起動・シャットダウンの管理
//! - [`usecase`] - ユースケース

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod usecase;
