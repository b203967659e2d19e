use serde::{Deserialize, Serialize};
use std::fmt;

/// 秘密情報をログ出力から保護するためのラッパー
#[derive(Clone, Deserialize, Serialize)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(val: T) -> Self {
        Self(val)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

// 誤ってログに出力されないようにマスクする
impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

/// 組立サービス全体の設定
///
/// 起動時に一度だけ構築し、参照で各コンポーネントに渡す。
/// 認証情報はコードにもリクエストにも埋め込まない。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// ストレージ API エンドポイント (Supabase Storage 互換)
    pub storage_url: String,
    /// ストレージの service role key
    pub storage_key: Secret<String>,
    /// アップロード先バケット名
    pub bucket_name: String,
    /// 成果物を配置するバケット内フォルダ
    pub output_folder: String,
    /// ジョブ毎のワークスペースを切るスクラッチルート
    pub scratch_root: String,
    /// エンコーダバイナリ（起動時に存在確認する）
    pub ffmpeg_bin: String,
    /// 素材ダウンロード1件あたりのデッドライン（秒）
    pub fetch_timeout_secs: u64,
    /// エンコーダ実行のデッドライン（秒）
    pub encode_timeout_secs: u64,
    /// 成果物アップロードのデッドライン（秒）
    pub publish_timeout_secs: u64,
    /// HTTP サーバーの待受ポート
    pub bind_port: u16,
}

impl AssemblyConfig {
    /// 設定をファイルまたは環境変数から読み込む
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            // デフォルト値の設定
            .set_default("storage_url", "http://localhost:54321")?
            .set_default("storage_key", "")?
            .set_default("bucket_name", "aetherion-media")?
            .set_default("output_folder", "video/assembled")?
            .set_default("scratch_root", "./workspace/assembly")?
            .set_default("ffmpeg_bin", "ffmpeg")?
            .set_default("fetch_timeout_secs", 60)?
            .set_default("encode_timeout_secs", 300)?
            .set_default("publish_timeout_secs", 120)?
            .set_default("bind_port", 5000)?
            // config.toml があれば読み込む
            .add_source(config::File::with_name("config").required(false))
            // 環境変数 (ASSEMBLY_*) があれば上書き
            .add_source(config::Environment::with_prefix("ASSEMBLY"))
            .build()?;

        settings.try_deserialize()
    }

    /// 成果物のリモートキー `{folder}/{name}` を組み立てる
    pub fn remote_key(&self, output_file_name: &str) -> String {
        format!(
            "{}/{}",
            self.output_folder.trim_end_matches('/'),
            output_file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_load_defaults() {
        let config = AssemblyConfig::load().unwrap();
        assert_eq!(config.bucket_name, "aetherion-media");
        assert_eq!(config.output_folder, "video/assembled");
        assert_eq!(config.ffmpeg_bin, "ffmpeg");
    }

    #[test]
    fn test_config_load_from_file() {
        // 一時的な config.toml を作成 (toml 拡張子を付加してフォーマットを認識させる)
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "storage_url = \"http://storage.internal:54321\"").unwrap();
        writeln!(file, "storage_key = \"test-service-key\"").unwrap();
        writeln!(file, "bucket_name = \"test-bucket\"").unwrap();
        writeln!(file, "output_folder = \"video/assembled\"").unwrap();
        writeln!(file, "scratch_root = \"/tmp/assembly\"").unwrap();
        writeln!(file, "ffmpeg_bin = \"ffmpeg\"").unwrap();
        writeln!(file, "fetch_timeout_secs = 10").unwrap();
        writeln!(file, "encode_timeout_secs = 30").unwrap();
        writeln!(file, "publish_timeout_secs = 15").unwrap();
        writeln!(file, "bind_port = 5001").unwrap();

        let settings = config::Config::builder()
            .add_source(config::File::from(file.path()))
            .build()
            .unwrap();

        let config: AssemblyConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.bucket_name, "test-bucket");
        assert_eq!(config.storage_key.expose(), "test-service-key");
        assert_eq!(config.bind_port, 5001);
    }

    #[test]
    fn test_secret_is_masked_in_debug() {
        let secret = Secret::new("super-secret-key".to_string());
        assert_eq!(format!("{:?}", secret), "********");
        assert_eq!(format!("{}", secret), "********");
        assert_eq!(secret.expose(), "super-secret-key");
    }

    #[test]
    fn test_remote_key_joins_folder_and_name() {
        let mut config = AssemblyConfig::load().unwrap();
        config.output_folder = "video/assembled/".to_string();
        assert_eq!(config.remote_key("clip.mp4"), "video/assembled/clip.mp4");
    }
}
