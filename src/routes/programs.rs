// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Program detail pages and their JSON counterparts.

use crate::error::{AppError, Result};
use crate::models::{PageMetadata, ProgramView};
use crate::render;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Public program routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/programs/{id}", get(program_page))
        .route("/api/programs/paths", get(program_paths))
        .route("/api/programs/{id}", get(program_detail))
        .route("/api/programs/{id}/metadata", get(program_metadata))
}

// ─── Pages ───────────────────────────────────────────────────

/// Rendered detail page; unknown ids get the not-found page with a 404.
async fn program_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response> {
    match state.programs.get_program(&id).await {
        Ok(program) => {
            let view = state.programs.view(&program);
            let metadata = PageMetadata::for_program(&program, state.programs.site_name());
            Ok(Html(render::render_program_page(&view, &metadata)).into_response())
        }
        Err(AppError::NotFound(_)) => {
            tracing::debug!(program_id = %id, "Program page not found");
            Ok((StatusCode::NOT_FOUND, Html(render::render_not_found())).into_response())
        }
        Err(e) => Err(e),
    }
}

// ─── Static Paths ────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgramPath {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PathsResponse {
    pub paths: Vec<ProgramPath>,
}

/// Every program id, for page pre-generation.
async fn program_paths(State(state): State<Arc<AppState>>) -> Result<Json<PathsResponse>> {
    let paths = state
        .programs
        .static_paths()
        .await?
        .into_iter()
        .map(|id| ProgramPath { id })
        .collect();

    Ok(Json(PathsResponse { paths }))
}

// ─── JSON ────────────────────────────────────────────────────

async fn program_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProgramView>> {
    Ok(Json(state.programs.program_view(&id).await?))
}

async fn program_metadata(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PageMetadata>> {
    Ok(Json(state.programs.page_metadata(&id).await?))
}
