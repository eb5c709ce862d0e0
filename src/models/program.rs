// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Program records and their display projections.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A program record stored in the `programs` collection.
///
/// The document key is surfaced as `id` through the Firestore document id
/// alias; the stored document itself carries no id field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(alias = "_firestore_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    /// UN Sustainable Development Goal numbers, in display order
    #[serde(default)]
    pub sdg_goals: Vec<u8>,
    /// Key into the static asset table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
}

/// Image resolved from the static asset table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProgramImage {
    pub url: String,
    pub hint: String,
}

/// Display model for the program detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProgramView {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image: Option<ProgramImage>,
}

/// Title and description for the page head.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PageMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PageMetadata {
    pub const NOT_FOUND_TITLE: &'static str = "Program Not Found";

    pub fn for_program(program: &Program, site_name: &str) -> Self {
        Self {
            title: format!("{} | {}", program.title, site_name),
            description: Some(program.summary.clone()),
        }
    }

    pub fn not_found() -> Self {
        Self {
            title: Self::NOT_FOUND_TITLE.to_string(),
            description: None,
        }
    }
}

/// Label shown on a goal badge.
pub fn goal_label(goal: u8) -> String {
    format!("SDG {}", goal)
}
