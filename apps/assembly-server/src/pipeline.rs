//! # AssemblyPipeline — 組立ジョブ・オーケストレーター
//!
//! 1リクエスト分のパイプラインを前進のみで実行する:
//! 検証 → ワークスペース確保 → フレーム取得 → 音声取得 → エンコード → 公開 → 清掃。
//! どの段階で失敗してもワークスペースは必ず破棄される。
//! 各段階には設定由来のデッドラインを適用し、超過したジョブは Timeout で中断する。

use assembly_core::contracts::{AssembleRequest, PublishReceipt};
use assembly_core::error::AssemblyError;
use assembly_core::traits::{ArtifactStore, AssetSource, VideoAssembler};
use infrastructure::workspace_manager::JobWorkspace;
use shared::config::AssemblyConfig;
use shared::security;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 組立パイプライン
///
/// I/O 実装はトレイト越しに注入する。ジョブ間で共有する可変状態は持たないため、
/// 複数ジョブの並行実行にロックは不要。
pub struct AssemblyPipeline {
    fetcher: Arc<dyn AssetSource>,
    assembler: Arc<dyn VideoAssembler>,
    store: Arc<dyn ArtifactStore>,
    config: Arc<AssemblyConfig>,
}

impl AssemblyPipeline {
    pub fn new(
        fetcher: Arc<dyn AssetSource>,
        assembler: Arc<dyn VideoAssembler>,
        store: Arc<dyn ArtifactStore>,
        config: Arc<AssemblyConfig>,
    ) -> Self {
        Self {
            fetcher,
            assembler,
            store,
            config,
        }
    }

    /// 1ジョブを最後まで実行する
    pub async fn execute(&self, req: AssembleRequest) -> Result<PublishReceipt, AssemblyError> {
        // 1. ネットワークI/Oより前にリクエストを検証する
        security::validate_output_name(&req.output_file_name).map_err(|e| {
            AssemblyError::Validation {
                reason: e.to_string(),
            }
        })?;

        // 2. ワークスペース確保。以降どの経路でも release で破棄する
        let workspace = JobWorkspace::acquire(Path::new(&self.config.scratch_root))?;
        let result = self.run_stages(&req, &workspace).await;
        workspace.release().await;
        result
    }

    async fn run_stages(
        &self,
        req: &AssembleRequest,
        workspace: &JobWorkspace,
    ) -> Result<PublishReceipt, AssemblyError> {
        let fetch_deadline = Duration::from_secs(self.config.fetch_timeout_secs);

        // 3. フレーム取得（現行のHTTP契約はフレームURL1件。内部は連番列で扱う）
        let frame_urls = vec![req.frames_folder_url.clone()];
        with_deadline(
            "fetch_frames",
            fetch_deadline,
            self.fetcher.fetch_frames(&frame_urls, &workspace.frames_dir()),
        )
        .await?;

        // 4. 音声取得
        with_deadline(
            "fetch_audio",
            fetch_deadline,
            self.fetcher.fetch(&req.audio_file_url, &workspace.audio_path()),
        )
        .await?;

        // 5. エンコード
        let output_path = workspace.output_path(&req.output_file_name);
        with_deadline(
            "encode",
            Duration::from_secs(self.config.encode_timeout_secs),
            self.assembler
                .assemble(&workspace.frames_dir(), &workspace.audio_path(), &output_path),
        )
        .await?;

        // 6. 公開
        let remote_key = self.config.remote_key(&req.output_file_name);
        let receipt = with_deadline(
            "publish",
            Duration::from_secs(self.config.publish_timeout_secs),
            self.store.publish(&output_path, &remote_key),
        )
        .await?;

        info!("🏆 Assembly Pipeline Completed: {}", receipt.remote_key);
        Ok(receipt)
    }
}

/// 段階単位のデッドライン。超過時は実行中の処理をキャンセルして Timeout で失敗させる
async fn with_deadline<T>(
    stage: &'static str,
    limit: Duration,
    fut: impl Future<Output = Result<T, AssemblyError>>,
) -> Result<T, AssemblyError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(AssemblyError::Timeout {
            stage,
            timeout_secs: limit.as_secs(),
        }),
    }
}
