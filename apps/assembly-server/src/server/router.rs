use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::pipeline::AssemblyPipeline;
use assembly_core::contracts::AssembleRequest;
use assembly_core::error::AssemblyError;

pub struct AppState {
    pub pipeline: Arc<AssemblyPipeline>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/assemble", post(assemble_handler))
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// --- REST API Handlers ---

async fn assemble_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssembleRequest>,
) -> impl IntoResponse {
    let job_id = Uuid::new_v4();
    let video_file = payload.output_file_name.clone();
    info!("🏗️ Job Accepted: {} -> {}", job_id, video_file);

    match state.pipeline.execute(payload).await {
        Ok(receipt) => {
            info!("✅ Job Completed: {} -> {}", job_id, receipt.remote_key);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "success",
                    "video_file": video_file,
                })),
            )
                .into_response()
        }
        Err(e) => {
            // フルのエラーはログのみ。応答にはサニタイズ済みの detail を載せる
            error!("❌ Job Failed: {} -> {}", job_id, e);
            (
                status_for(&e),
                Json(serde_json::json!({
                    "status": "error",
                    "detail": e.public_detail(),
                })),
            )
                .into_response()
        }
    }
}

/// エラー種別を HTTP ステータスに対応付ける
fn status_for(err: &AssemblyError) -> StatusCode {
    match err {
        AssemblyError::Validation { .. } => StatusCode::BAD_REQUEST,
        AssemblyError::Fetch { .. } | AssemblyError::Publish { .. } => StatusCode::BAD_GATEWAY,
        AssemblyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        AssemblyError::Resource { .. } | AssemblyError::Encoding { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
