//! # The Contract — コンポーネント間通信契約
//!
//! パイプラインの各段階が受け渡す型を定義する。
//! `FetchedAsset` と `AssemblyOutput` はワークスペースより長生きしない。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// --- Assemble クラスター ---

/// `POST /assemble` のリクエストボディ。1ジョブにつき1件、不変。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleRequest {
    /// フレーム画像の取得元 URL
    pub frames_folder_url: String,
    /// 音声トラックの取得元 URL
    pub audio_file_url: String,
    /// 成果物のファイル名（パス区切りを含まない leaf name であること）
    pub output_file_name: String,
}

// --- Fetch クラスター ---

/// ダウンロード済み素材。Fetcher が生成し、Invoker のみが消費する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedAsset {
    pub source_url: String,
    pub local_path: PathBuf,
    pub byte_size: u64,
}

// --- Encode クラスター ---

/// エンコード完了した成果物。出力ファイルの実在と非ゼロサイズを検証済み。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyOutput {
    pub output_path: PathBuf,
    pub byte_size: u64,
}

// --- Publish クラスター ---

/// ジョブの終端成果物。リモートキーはストレージ層で冪等（再公開は上書き）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub remote_key: String,
    pub byte_size: u64,
}
