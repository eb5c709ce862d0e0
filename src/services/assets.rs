// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Static placeholder image table.
//!
//! Images are not stored in the database; programs reference them by id.

use serde::Deserialize;

const BUILTIN_TABLE: &str = include_str!("../../data/placeholder-images.json");

/// One entry of the image table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderImage {
    pub id: String,
    pub description: String,
    pub image_url: String,
    pub image_hint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableFile {
    placeholder_images: Vec<PlaceholderImage>,
}

/// Lookup table from image id to image.
#[derive(Debug, Default, Clone)]
pub struct AssetTable {
    images: Vec<PlaceholderImage>,
}

impl AssetTable {
    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, AssetError> {
        Self::load_from_json(BUILTIN_TABLE)
    }

    /// Load the table from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, AssetError> {
        let file: TableFile =
            serde_json::from_str(json_data).map_err(|e| AssetError::ParseError(e.to_string()))?;

        tracing::info!(count = file.placeholder_images.len(), "Loaded image table");
        Ok(Self {
            images: file.placeholder_images,
        })
    }

    pub fn images(&self) -> &[PlaceholderImage] {
        &self.images
    }

    /// Find an image by exact id.
    pub fn find(&self, id: &str) -> Option<&PlaceholderImage> {
        self.images.iter().find(|image| image.id == id)
    }
}

/// Errors from loading the image table.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to parse image table: {0}")]
    ParseError(String),
}
