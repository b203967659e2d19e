//! # Core — ドメインロジック層
//!
//! Aetherion 組立パイプラインのエラー・契約・トレイトを定義する。
//! 具体的なI/O実装は `infrastructure` クレートに委譲する（依存性逆転の原則）。

pub mod contracts;
pub mod error;
pub mod traits;
