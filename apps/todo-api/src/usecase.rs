//! # ユースケース層
//!
//! Todo API のアプリケーションロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリと時刻プロバイダを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは入力の検証と変換のみを行い、ロジックはユースケースに集約

pub mod todo;

pub use todo::TodoUseCaseImpl;
