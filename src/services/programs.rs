// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Program lookup and display projection.

use crate::backend::ServiceHandle;
use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::program::goal_label;
use crate::models::{PageMetadata, Program, ProgramImage, ProgramView};
use crate::services::assets::AssetTable;

/// Fetches programs for page rendering.
///
/// With no store configured every lookup is a miss and the path list is
/// empty; pages degrade to not-found rather than erroring.
#[derive(Clone)]
pub struct ProgramService {
    store: ServiceHandle<dyn DocumentStore>,
    assets: AssetTable,
    site_name: String,
}

impl ProgramService {
    pub fn new(
        store: ServiceHandle<dyn DocumentStore>,
        assets: AssetTable,
        site_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            assets,
            site_name: site_name.into(),
        }
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Look up exactly one program.
    pub async fn get_program(&self, id: &str) -> Result<Program, AppError> {
        let Some(store) = self.store.ready() else {
            tracing::debug!(program_id = id, "No content store, program lookup misses");
            return Err(not_found(id));
        };

        let mut program = store.get_program(id).await?.ok_or_else(|| not_found(id))?;
        if program.id.is_empty() {
            program.id = id.to_string();
        }
        Ok(program)
    }

    /// Every program key currently in the store.
    pub async fn static_paths(&self) -> Result<Vec<String>, AppError> {
        let Some(store) = self.store.ready() else {
            return Ok(Vec::new());
        };

        let ids: Vec<String> = store
            .list_programs()
            .await?
            .into_iter()
            .map(|program| program.id)
            .filter(|id| !id.is_empty())
            .collect();

        tracing::debug!(count = ids.len(), "Enumerated program paths");
        Ok(ids)
    }

    /// Project a program into its page display model.
    pub fn view(&self, program: &Program) -> ProgramView {
        let image = program
            .image_id
            .as_deref()
            .and_then(|image_id| self.assets.find(image_id))
            .map(|image| ProgramImage {
                url: image.image_url.clone(),
                hint: image.image_hint.clone(),
            });

        ProgramView {
            id: program.id.clone(),
            title: program.title.clone(),
            summary: program.summary.clone(),
            description: program.description.clone(),
            tags: program.sdg_goals.iter().copied().map(goal_label).collect(),
            image,
        }
    }

    pub async fn program_view(&self, id: &str) -> Result<ProgramView, AppError> {
        let program = self.get_program(id).await?;
        Ok(self.view(&program))
    }

    /// Page title and description; unknown ids get the not-found title.
    pub async fn page_metadata(&self, id: &str) -> Result<PageMetadata, AppError> {
        match self.get_program(id).await {
            Ok(program) => Ok(PageMetadata::for_program(&program, &self.site_name)),
            Err(AppError::NotFound(_)) => Ok(PageMetadata::not_found()),
            Err(e) => Err(e),
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Program {} not found", id))
}
