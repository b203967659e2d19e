//! # MediaForge — FFmpeg 動画組立エンジン
//!
//! フレーム連番と音声トラックを外部エンコーダで1本の動画に合成する。
//! エンコーダはブラックボックスとして扱い、引数契約と終了コードだけを信頼する。
//! 非ゼロ終了はリトライしない（エンコーダは決定的で、失敗はほぼ入力不良を意味する）。

use assembly_core::contracts::AssemblyOutput;
use assembly_core::error::AssemblyError;
use assembly_core::traits::VideoAssembler;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::info;

/// FFmpeg を使用した動画組立クライアント
#[derive(Clone)]
pub struct MediaForgeClient {
    encoder_bin: String,
}

impl MediaForgeClient {
    pub fn new(encoder_bin: &str) -> Self {
        Self {
            encoder_bin: encoder_bin.to_string(),
        }
    }

    /// エンコーダバイナリが起動可能かを確認する（起動時チェック用）。
    /// 不在はプロセス設定の誤りであり、ジョブ毎のエラーにしない。
    pub async fn preflight(&self) -> Result<(), AssemblyError> {
        let output = Command::new(&self.encoder_bin)
            .arg("-version")
            .output()
            .await
            .map_err(|e| AssemblyError::Encoding {
                exit_code: None,
                stderr: format!("Encoder binary '{}' not available: {}", self.encoder_bin, e),
            })?;

        if !output.status.success() {
            return Err(AssemblyError::Encoding {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VideoAssembler for MediaForgeClient {
    /// 引数契約:
    /// - フレームレート固定 1fps
    /// - `frames_dir/*.png` の glob（辞書順 = 再生順。ゼロ詰め連番が前提）
    /// - 音声1トラック、`-shortest` で短い方のストリームに合わせて打ち切り
    /// - ピクセルフォーマットは再生互換性の高い yuv420p に固定
    async fn assemble(
        &self,
        frames_dir: &Path,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<AssemblyOutput, AssemblyError> {
        let glob_pattern = format!("{}/*.png", frames_dir.display());

        info!(
            "🎬 MediaForge: Assembling {} + {} -> {}",
            glob_pattern,
            audio_path.display(),
            output_path.display()
        );

        let mut cmd = Command::new(&self.encoder_bin);
        cmd.arg("-y")
            .arg("-framerate")
            .arg("1")
            .arg("-pattern_type")
            .arg("glob")
            .arg("-i")
            .arg(&glob_pattern)
            .arg("-i")
            .arg(audio_path)
            .arg("-shortest")
            .arg("-pix_fmt")
            .arg("yuv420p")
            .arg(output_path)
            .kill_on_drop(true);

        let output = cmd.output().await.map_err(|e| AssemblyError::Encoding {
            exit_code: None,
            stderr: format!("Failed to spawn encoder: {}", e),
        })?;

        if !output.status.success() {
            return Err(AssemblyError::Encoding {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        // エンコーダは exit 0 でも出力を残さないことがある (Hollow Artifact 防止)
        let metadata =
            tokio::fs::metadata(output_path)
                .await
                .map_err(|e| AssemblyError::Encoding {
                    exit_code: output.status.code(),
                    stderr: format!("Encoder exited 0 but output is missing: {}", e),
                })?;

        if metadata.len() == 0 {
            return Err(AssemblyError::Encoding {
                exit_code: output.status.code(),
                stderr: "Encoder exited 0 but output is 0 bytes".to_string(),
            });
        }

        info!("✅ MediaForge: Output ready ({} bytes)", metadata.len());

        Ok(AssemblyOutput {
            output_path: output_path.to_path_buf(),
            byte_size: metadata.len(),
        })
    }
}
