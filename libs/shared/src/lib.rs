//! # Shared — 横断ユーティリティ層
//!
//! プロセス設定と入力検証。上位レイヤー（core / infrastructure / app）の
//! どこからでも参照される最下層のクレート。

pub mod config;
pub mod security;
