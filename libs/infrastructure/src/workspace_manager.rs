//! # Workspace Manager — The Caretaker
//!
//! 1ジョブ分の隔離されたワークスペースの確保と清掃を担う独立モジュール。
//! 確保はジョブ開始時、破棄はジョブ終了時に成功・失敗を問わず必ず行う。
//! 破棄の失敗はジョブ本来の結果を隠してはならないため、ログに留める。

use assembly_core::error::AssemblyError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// 1ジョブが占有するエフェメラルなディレクトリツリー
///
/// レイアウト:
/// ```text
/// <scratch_root>/job_<uuid>/
///   frames/          フレーム画像 (frame_0001.png, ...)
///   audio.mp3        音声トラック
///   <output_name>    エンコード済み成果物
/// ```
pub struct JobWorkspace {
    root: PathBuf,
    released: bool,
}

impl JobWorkspace {
    /// 衝突しない一意な名前でワークスペースを確保する。
    /// ディスク枯渇や権限エラーは `Resource` としてネットワークI/Oより前にジョブを中断させる。
    pub fn acquire(scratch_root: &Path) -> Result<Self, AssemblyError> {
        let root = scratch_root.join(format!("job_{}", Uuid::new_v4()));
        std::fs::create_dir_all(root.join("frames")).map_err(|e| AssemblyError::Resource {
            reason: format!("Failed to create workspace dir {}: {}", root.display(), e),
        })?;

        info!("📂 Workspace acquired: {}", root.display());
        Ok(Self {
            root,
            released: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    pub fn audio_path(&self) -> PathBuf {
        self.root.join("audio.mp3")
    }

    pub fn output_path(&self, output_file_name: &str) -> PathBuf {
        self.root.join(output_file_name)
    }

    /// ワークスペース全体を再帰的に破棄する。冪等。
    pub async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(_) => info!("🧹 Workspace released: {}", self.root.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "⚠️ Workspace cleanup failed for {}: {}",
                self.root.display(),
                e
            ),
        }
    }
}

impl Drop for JobWorkspace {
    // キャンセルやパニックで release を通らなかった経路でも破棄する
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "⚠️ Workspace drop-cleanup failed for {}: {}",
                    self.root.display(),
                    e
                );
            }
        }
    }
}
