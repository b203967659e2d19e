use infrastructure::asset_fetcher::AssetFetcher;
use infrastructure::media_forge::MediaForgeClient;
use infrastructure::storage_vault::StorageVault;
use shared::config::AssemblyConfig;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

mod pipeline;
mod server;

use pipeline::AssemblyPipeline;
use server::router::{create_router, AppState};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// 組立サーバーモード
    Serve {
        /// 待受ポート (未指定なら設定値)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // 1. 設定を読み込む (認証情報は環境変数 or config.toml のみ)
    let config = Arc::new(
        AssemblyConfig::load().map_err(|e| anyhow::anyhow!("Config load failed: {}", e))?,
    );
    info!("⚙️  Config loaded:");
    info!("   Storage:  {}", config.storage_url);
    info!("   Bucket:   {}", config.bucket_name);
    info!("   Folder:   {}", config.output_folder);
    info!("   Scratch:  {}", config.scratch_root);

    // 2. スクラッチルートの確保
    std::fs::create_dir_all(&config.scratch_root)?;

    // 3. インフラクライアントの準備
    let http_client = reqwest::Client::new();
    let fetcher = Arc::new(AssetFetcher::new(http_client.clone()));
    let media_forge = Arc::new(MediaForgeClient::new(&config.ffmpeg_bin));

    // エンコーダ不在は起動時の設定エラーとして扱う (ジョブ毎のエラーにしない)
    media_forge
        .preflight()
        .await
        .map_err(|e| anyhow::anyhow!("Encoder preflight failed: {}", e))?;
    info!("🎬 Encoder ready: {}", config.ffmpeg_bin);

    let vault = Arc::new(StorageVault::new(
        http_client,
        &config.storage_url,
        config.storage_key.clone(),
        &config.bucket_name,
    ));

    // 4. パイプライン構築
    let pipeline = Arc::new(AssemblyPipeline::new(
        fetcher,
        media_forge,
        vault,
        config.clone(),
    ));

    let port = match args.command {
        Some(Commands::Serve { port }) => port.unwrap_or(config.bind_port),
        None => config.bind_port,
    };

    // 5. HTTP サーバー起動
    let state = Arc::new(AppState { pipeline });
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("📡 Assembly server listening on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("🛑 SIGINT received. Shutting down gracefully...");
        })
        .await?;

    Ok(())
}
