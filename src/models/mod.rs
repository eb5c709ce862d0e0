// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Data models for the application.

pub mod program;
pub mod user;

pub use program::{PageMetadata, Program, ProgramImage, ProgramView};
pub use user::{AppUser, Principal, Role, UserProfile};
