//! # Todo ドメイン層
//!
//! Todo 項目のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つ [`todo::Todo`]
//! - **値オブジェクト**: [`todo::TodoId`], [`todo::TodoTitle`]
//! - **ドメインエラー**: ビジネスルール違反を表現する [`DomainError`]
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`todo`] - Todo エンティティと値オブジェクト

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod todo;

pub use error::DomainError;
