// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Auth-state source consumed by sessions.

use crate::error::AppError;
use crate::models::Principal;
use async_trait::async_trait;
use tokio::sync::watch;

/// Source of sign-in state for one visitor.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Subscribe to sign-in state. The receiver starts at the current value.
    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;

    /// Sign out. The change is observed through [`AuthProvider::subscribe`].
    async fn sign_out(&self) -> Result<(), AppError>;
}

/// Auth state held in process, fed by verified ID tokens.
pub struct LocalAuth {
    state: watch::Sender<Option<Principal>>,
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self {
            state: watch::channel(None).0,
        }
    }
}

impl LocalAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signed-in principal. Repeating the same principal is silent.
    pub fn sign_in(&self, principal: Principal) {
        self.state.send_if_modified(|current| {
            if current.as_ref() == Some(&principal) {
                return false;
            }
            *current = Some(principal);
            true
        });
    }

    pub fn current(&self) -> Option<Principal> {
        self.state.borrow().clone()
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.state.subscribe()
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.state.send_if_modified(|current| current.take().is_some());
        Ok(())
    }
}
