//! `POST /analyze/`: upload the configured workbooks, get the ranked results back.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, Method};
use axum::routing::post;
use axum::{Json, Router};
use tempfile::TempDir;
use tower_http::cors::{Any, CorsLayer};

use crate::analysis::{AnalysisReport, run_full_analysis};
use crate::config::AnalysisConfig;
use crate::data::ResultsMap;

use super::error::ApiError;

/// Front-end origins allowed to call the API.
pub const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:4321", "http://127.0.0.1:4321"];

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub struct ApiState {
    pub config: AnalysisConfig,
}

pub type SharedState = Arc<ApiState>;

/// One uploaded file, held in memory until staged to disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Required names with no matching upload, in configuration order.
pub fn missing_required_files(required: &[String], uploads: &[UploadedFile]) -> Vec<String> {
    let uploaded: HashSet<&str> = uploads.iter().map(|u| u.file_name.as_str()).collect();
    required
        .iter()
        .filter(|name| !uploaded.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Final path component only, so an upload can never land outside the staging dir.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = Path::new(raw.trim()).file_name()?.to_str()?;
    (!name.is_empty() && name != "." && name != "..").then(|| name.to_string())
}

/// Write the uploads into a fresh temporary directory and run the analysis
/// over it. The directory is removed when this returns.
pub fn stage_and_analyze(uploads: &[UploadedFile], config: &AnalysisConfig) -> Result<AnalysisReport> {
    let staging = TempDir::new().context("Failed to create staging directory")?;
    log::info!("Created temporary directory for analysis: {}", staging.path().display());

    for upload in uploads {
        let path = staging.path().join(&upload.file_name);
        std::fs::write(&path, &upload.bytes)
            .with_context(|| format!("Failed to stage upload: {}", path.display()))?;
        log::debug!("Saved uploaded file to {}", path.display());
    }

    Ok(run_full_analysis(staging.path(), config))
}

async fn read_uploads(multipart: &mut Multipart) -> Result<Vec<UploadedFile>, ApiError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        // Plain form fields carry no file name
        let Some(file_name) = field.file_name().and_then(sanitize_file_name) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.to_string()))?;
        uploads.push(UploadedFile {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Ok(uploads)
}

/// POST /analyze/
pub async fn analyze(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<ResultsMap>, ApiError> {
    let uploads = read_uploads(&mut multipart).await?;

    let missing = missing_required_files(&state.config.required_files(), &uploads);
    if !missing.is_empty() {
        return Err(ApiError::MissingFiles(missing));
    }

    let worker_state = state.clone();
    let report = tokio::task::spawn_blocking(move || {
        stage_and_analyze(&uploads, &worker_state.config)
    })
    .await
    .context("Analysis task panicked")??;

    if report.is_empty() {
        return Err(ApiError::NoResults);
    }
    log::info!(
        "✅ Analysis request served: {} results, {} skipped sheets",
        report.total_results(),
        report.total_skipped()
    );
    Ok(Json(report.results_map()))
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(ALLOWED_ORIGINS.map(HeaderValue::from_static))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Build and return the API router.
pub fn build_router(state: ApiState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/analyze/", post(analyze))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors_layer())
        .with_state(shared)
}
