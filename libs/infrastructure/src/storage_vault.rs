//! # StorageVault — オブジェクトストレージへの成果物公開
//!
//! Supabase Storage 互換の REST API に対して認証付きで動画をアップロードする。
//! 同一キーへの再公開は上書き (`x-upsert: true`) とし、ストレージ層で冪等にする。
//! この層ではリトライしない（一時的なネットワーク障害は呼び出し側の関心事）。

use assembly_core::contracts::PublishReceipt;
use assembly_core::error::AssemblyError;
use assembly_core::traits::ArtifactStore;
use async_trait::async_trait;
use shared::config::Secret;
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::info;

/// オブジェクトストレージへの書き込みクライアント
///
/// グローバルなクライアントは持たず、起動時に構築してパイプラインへ注入する。
#[derive(Clone)]
pub struct StorageVault {
    client: reqwest::Client,
    storage_url: String,
    service_key: Secret<String>,
    bucket: String,
}

impl StorageVault {
    pub fn new(
        client: reqwest::Client,
        storage_url: &str,
        service_key: Secret<String>,
        bucket: &str,
    ) -> Self {
        Self {
            client,
            storage_url: storage_url.trim_end_matches('/').to_string(),
            service_key,
            bucket: bucket.to_string(),
        }
    }

    fn object_url(&self, remote_key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.storage_url, self.bucket, remote_key
        )
    }
}

#[async_trait]
impl ArtifactStore for StorageVault {
    async fn publish(
        &self,
        local_path: &Path,
        remote_key: &str,
    ) -> Result<PublishReceipt, AssemblyError> {
        let publish_err = |http_status: Option<u16>, reason: String| AssemblyError::Publish {
            remote_key: remote_key.to_string(),
            http_status,
            reason,
        };

        let metadata = tokio::fs::metadata(local_path)
            .await
            .map_err(|e| publish_err(None, format!("Artifact missing: {}", e)))?;
        let byte_size = metadata.len();

        // 成果物はメモリに読み込まず、ファイルからそのままストリームする
        let file = tokio::fs::File::open(local_path)
            .await
            .map_err(|e| publish_err(None, format!("Failed to open artifact: {}", e)))?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let url = self.object_url(remote_key);
        info!(
            "📤 StorageVault: Uploading {} bytes -> {}/{}",
            byte_size, self.bucket, remote_key
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.service_key.expose())
            .header(reqwest::header::CONTENT_TYPE, "video/mp4")
            .header(reqwest::header::CONTENT_LENGTH, byte_size)
            .header("x-upsert", "true")
            .body(body)
            .send()
            .await
            .map_err(|e| publish_err(None, format!("Upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(publish_err(Some(status.as_u16()), detail));
        }

        info!("✅ StorageVault: Published {}", remote_key);

        Ok(PublishReceipt {
            remote_key: remote_key.to_string(),
            byte_size,
        })
    }
}
