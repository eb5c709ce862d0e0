// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Static generation of program detail pages.

use crate::error::AppError;
use crate::models::PageMetadata;
use crate::render;
use crate::services::ProgramService;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Write `<out_dir>/programs/<id>.html` for every program path.
///
/// Programs that disappear between listing and fetching are skipped.
/// Returns the files written.
pub async fn prerender_site(
    programs: &ProgramService,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let page_dir = out_dir.join("programs");
    tokio::fs::create_dir_all(&page_dir)
        .await
        .with_context(|| format!("creating {}", page_dir.display()))?;

    let ids = programs.static_paths().await?;
    tracing::info!(count = ids.len(), dir = %page_dir.display(), "Prerendering program pages");

    let mut written = Vec::with_capacity(ids.len());
    for id in ids {
        let program = match programs.get_program(&id).await {
            Ok(program) => program,
            Err(AppError::NotFound(_)) => {
                tracing::warn!(program_id = %id, "Program vanished during prerender, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let view = programs.view(&program);
        let metadata = PageMetadata::for_program(&program, programs.site_name());
        let html = render::render_program_page(&view, &metadata);

        let path = page_dir.join(format!("{}.html", urlencoding::encode(&id)));
        tokio::fs::write(&path, html)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(program_id = %id, path = %path.display(), "Wrote program page");
        written.push(path);
    }

    Ok(written)
}
