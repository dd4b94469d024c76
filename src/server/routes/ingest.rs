//! Ingestion-triggering endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::ingestion::IngestReport;
use crate::server::state::AppState;

/// POST /api/ingest - (Re-)ingest the configured source document
///
/// Out-of-band from query serving. Deterministic entry ids make a re-run
/// overwrite rather than duplicate.
pub async fn ingest_corpus(State(state): State<AppState>) -> Result<Json<IngestReport>> {
    let path = state.config().ingestion.source_path.clone();
    let report = state.pipeline().ingest(&path).await?;
    Ok(Json(report))
}
