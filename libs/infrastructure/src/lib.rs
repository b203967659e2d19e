//! # Infrastructure — I/O実装層
//!
//! `core` で定義されたトレイトの具体実装を提供する。
//! HTTP ダウンロード、FFmpeg、オブジェクトストレージとの通信を担当。

pub mod asset_fetcher;
pub mod media_forge;
pub mod storage_vault;
pub mod workspace_manager;

#[cfg(test)]
mod storage_vault_tests;
