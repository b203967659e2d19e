//! # ドメイントレイト定義
//!
//! 組立パイプラインの3つのI/Oモジュールのインターフェースを定義する。
//! 具体実装は `libs/infrastructure` に配置する（依存性逆転の原則）。
//! テストではこの層にフェイクを注入する。

use crate::contracts::{AssemblyOutput, FetchedAsset, PublishReceipt};
use crate::error::AssemblyError;
use async_trait::async_trait;
use std::path::Path;

/// 素材取得ツール (AssetFetcher)
///
/// 呼び出し元が指定した URI からフレーム画像・音声トラックを取得する。
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// 1つのリモート素材を `dest` にダウンロードする。
    /// 失敗時に部分ファイルを残してはならない。
    async fn fetch(&self, url: &str, dest: &Path) -> Result<FetchedAsset, AssemblyError>;

    /// フレーム列を `frames_dir` に取得する。
    ///
    /// ファイル名はゼロ詰め連番 (`frame_0001.png`, ...) とし、
    /// glob の辞書順がリクエストの並び順 = 再生順に一致することを保証する。
    async fn fetch_frames(
        &self,
        urls: &[String],
        frames_dir: &Path,
    ) -> Result<Vec<FetchedAsset>, AssemblyError> {
        let mut assets = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            let dest = frames_dir.join(format!("frame_{:04}.png", index + 1));
            assets.push(self.fetch(url, &dest).await?);
        }
        Ok(assets)
    }
}

/// 動画組立ツール (MediaForge)
///
/// 外部エンコーダを起動してフレーム列と音声を1本の動画に合成する。
#[async_trait]
pub trait VideoAssembler: Send + Sync {
    /// `frames_dir` 内の全フレームと音声トラックから `output_path` を生成する。
    /// 終了コード 0 でも出力が欠落・空の場合はエラーとする。
    async fn assemble(
        &self,
        frames_dir: &Path,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<AssemblyOutput, AssemblyError>;
}

/// 成果物公開ツール (StorageVault)
///
/// 認証付きでリモートオブジェクトストレージに書き込む。
/// 同一キーへの再公開は上書きであり、ストレージ層で冪等。
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn publish(
        &self,
        local_path: &Path,
        remote_key: &str,
    ) -> Result<PublishReceipt, AssemblyError>;
}
