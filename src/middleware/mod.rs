// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Middleware modules (authentication, security headers).

pub mod auth;
pub mod security;

pub use auth::{identify_principal, CurrentPrincipal};
