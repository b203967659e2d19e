//! # ドメインエラー型
//!
//! `thiserror` を使い、組立ジョブのすべての失敗モードに明確な型を付与する。
//! Iron Principles: `unwrap()` / `expect()` は禁止。

use thiserror::Error;

/// 組立ジョブのドメインエラー
///
/// どのエラーもジョブを即座に中断させる（部分成功は存在しない）。
/// リトライはこの層では行わず、呼び出し側の責務とする。
#[derive(Debug, Error)]
pub enum AssemblyError {
    // === ワークスペース確保 ===
    #[error("ワークスペース確保に失敗: {reason}")]
    Resource { reason: String },

    // === 素材取得 ===
    #[error("素材ダウンロード失敗 (url: {locator}): {reason}")]
    Fetch { locator: String, reason: String },

    // === エンコーダ実行 ===
    #[error("エンコーダ実行エラー (exit: {exit_code:?}): {stderr}")]
    Encoding {
        exit_code: Option<i32>,
        stderr: String,
    },

    // === ストレージ公開 ===
    #[error("成果物アップロード失敗 (key: {remote_key}, status: {http_status:?}): {reason}")]
    Publish {
        remote_key: String,
        http_status: Option<u16>,
        reason: String,
    },

    // === デッドライン超過 ===
    #[error("処理タイムアウト ({stage}: {timeout_secs}秒)")]
    Timeout {
        stage: &'static str,
        timeout_secs: u64,
    },

    // === リクエスト検証 ===
    #[error("リクエスト検証エラー: {reason}")]
    Validation { reason: String },
}

impl AssemblyError {
    /// 外部応答に載せる詳細メッセージ。
    /// 生の stderr、ローカルパス、認証情報は含めない（フルのエラーはサーバー側ログに残る）。
    pub fn public_detail(&self) -> String {
        match self {
            Self::Resource { .. } => "Workspace allocation failed".to_string(),
            Self::Fetch { locator, .. } => format!("Download failed: {}", locator),
            Self::Encoding { exit_code, .. } => match exit_code {
                Some(code) => format!("Video assembly failed (encoder exit {})", code),
                None => "Video assembly failed (encoder terminated)".to_string(),
            },
            Self::Publish {
                remote_key,
                http_status,
                ..
            } => match http_status {
                Some(status) => format!("Upload rejected for '{}' (HTTP {})", remote_key, status),
                None => format!("Upload failed for '{}'", remote_key),
            },
            Self::Timeout {
                stage,
                timeout_secs,
            } => format!("Operation timed out ({} after {}s)", stage, timeout_secs),
            Self::Validation { reason } => format!("Invalid request: {}", reason),
        }
    }
}
