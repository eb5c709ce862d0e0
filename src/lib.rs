// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! SEQHER site backend
//!
//! Renders program detail pages from the document store and keeps each
//! signed-in visitor's profile in sync, degrading gracefully when backend
//! services are not configured.

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod prerender;
pub mod render;
pub mod routes;
pub mod services;
pub mod session;

use backend::{Backend, ServiceHandle};
use config::Config;
use models::Principal;
use services::{AssetTable, ProgramService};
use session::{AuthProvider, AuthSession, LocalAuth, SessionHub, SessionOptions};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: Backend,
    pub programs: ProgramService,
    pub sessions: SessionHub,
}

impl AppState {
    pub fn new(config: Config, backend: Backend, assets: AssetTable) -> Self {
        let programs = ProgramService::new(backend.content_store(), assets, &config.site_name);
        Self {
            config,
            backend,
            programs,
            sessions: SessionHub::new(),
        }
    }

    /// Start a session for a verified principal, or an anonymous one.
    pub fn start_session(&self, principal: Option<Principal>) -> AuthSession {
        let auth: ServiceHandle<dyn AuthProvider> = match &self.backend.client.auth {
            ServiceHandle::Unavailable(reason) => ServiceHandle::Unavailable(reason.clone()),
            ServiceHandle::Ready(_) => {
                let source: Arc<dyn AuthProvider> = match principal {
                    Some(principal) => self.sessions.sign_in(principal),
                    None => Arc::new(LocalAuth::new()),
                };
                ServiceHandle::Ready(source)
            }
        };

        AuthSession::start(
            auth,
            self.backend.client.store.clone(),
            SessionOptions {
                profile_timeout: self.config.profile_timeout,
            },
        )
    }
}
