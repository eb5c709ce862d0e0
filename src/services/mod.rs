// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Services module - business logic layer.

pub mod assets;
pub mod firebase_auth;
pub mod functions;
pub mod programs;

pub use assets::{AssetError, AssetTable};
pub use firebase_auth::{FirebaseTokenVerifier, TokenError};
pub use functions::FunctionsClient;
pub use programs::ProgramService;
