//! # AssetFetcher — 素材ダウンローダ
//!
//! 呼び出し元が指定した URI から画像・音声素材をワークスペース内へ取得する。
//! 転送はチャンク単位のストリーミングで行い、大容量素材でもメモリを圧迫しない。
//! 書き込みは一時名に対して行い、完走後にアトミックリネームする。
//! 失敗時に部分ファイルは残さない。

use assembly_core::contracts::FetchedAsset;
use assembly_core::error::AssemblyError;
use assembly_core::traits::AssetSource;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// HTTP GET による素材取得クライアント
#[derive(Clone)]
pub struct AssetFetcher {
    client: reqwest::Client,
}

impl AssetFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// レスポンスボディを一時ファイルにストリーム書き込みし、総バイト数を返す
    async fn stream_to_file(
        &self,
        response: reqwest::Response,
        part_path: &Path,
    ) -> Result<u64, String> {
        let mut file = tokio::fs::File::create(part_path)
            .await
            .map_err(|e| format!("Failed to create local file: {}", e))?;

        let mut stream = response.bytes_stream();
        let mut total: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| format!("Transfer interrupted: {}", e))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| format!("Failed to write chunk: {}", e))?;
            total += bytes.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| format!("Failed to flush file: {}", e))?;
        drop(file);

        Ok(total)
    }
}

#[async_trait]
impl AssetSource for AssetFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<FetchedAsset, AssemblyError> {
        info!("📥 AssetFetcher: Downloading {} -> {}", url, dest.display());

        let fetch_err = |reason: String| AssemblyError::Fetch {
            locator: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(format!("Connection failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("Remote returned HTTP {}", status.as_u16())));
        }

        let file_name = dest
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| fetch_err("Invalid destination file name".to_string()))?;
        let part_path = dest.with_file_name(format!("{}.part", file_name));

        let total = match self.stream_to_file(response, &part_path).await {
            Ok(total) => total,
            Err(reason) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(fetch_err(reason));
            }
        };

        // 0バイトのダウンロードは素材として成立しない
        if total == 0 {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(fetch_err("Received 0 bytes".to_string()));
        }

        tokio::fs::rename(&part_path, dest)
            .await
            .map_err(|e| fetch_err(format!("Failed to finalize file: {}", e)))?;

        info!(
            "✅ AssetFetcher: Saved {} ({} bytes)",
            dest.display(),
            total
        );

        Ok(FetchedAsset {
            source_url: url.to_string(),
            local_path: dest.to_path_buf(),
            byte_size: total,
        })
    }
}
