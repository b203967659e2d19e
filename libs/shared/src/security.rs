//! # Security — リクエスト入力の検証
//!
//! 信頼できない入力がファイルシステムパスに合流する箇所を守る。
//! 検証はネットワークI/Oより前に行うこと。

use anyhow::{bail, Result};

/// ワークスペース内で入力素材が占める名前。出力がこれらを上書きしてはならない
const RESERVED_NAMES: &[&str] = &["audio.mp3", "frames"];

/// 成果物ファイル名が安全な leaf name であることを検証する
///
/// 拒否するもの:
/// - 空文字
/// - パス区切り (`/`, `\`) や NUL を含む名前（パス・トラバーサル）
/// - `.` / `..`
/// - 隠しファイル化する先頭ドット
/// - ワークスペースの入力素材と衝突する予約名
pub fn validate_output_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("output_file_name must not be empty");
    }
    if name == "." || name == ".." {
        bail!("output_file_name must not be a directory reference");
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        bail!("output_file_name must not contain path separators");
    }
    if name.starts_with('.') {
        bail!("output_file_name must not start with '.'");
    }
    if RESERVED_NAMES.contains(&name) {
        bail!("output_file_name '{}' is reserved", name);
    }
    Ok(())
}
