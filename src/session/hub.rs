// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Auth state shared by all sessions of the same principal.

use super::auth::{AuthProvider, LocalAuth};
use crate::error::AppError;
use crate::models::Principal;
use dashmap::DashMap;
use std::sync::{Arc, Weak};

/// Per-principal auth sources. Signing out through the hub reaches every
/// open session for that principal.
///
/// Entries are weak: a source lives only as long as some session holds it.
#[derive(Default)]
pub struct SessionHub {
    auth: DashMap<String, Weak<LocalAuth>>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auth source for `principal`, marked signed in.
    pub fn sign_in(&self, principal: Principal) -> Arc<LocalAuth> {
        self.prune();

        let auth = {
            let mut entry = self.auth.entry(principal.uid.clone()).or_default();
            match entry.upgrade() {
                Some(auth) => auth,
                None => {
                    let auth = Arc::new(LocalAuth::new());
                    *entry = Arc::downgrade(&auth);
                    auth
                }
            }
        };
        auth.sign_in(principal);
        auth
    }

    /// Sign the principal out and forget it. Unknown ids are ignored.
    pub async fn sign_out(&self, uid: &str) -> Result<(), AppError> {
        let Some(auth) = self.auth.remove(uid).and_then(|(_, auth)| auth.upgrade()) else {
            return Ok(());
        };
        tracing::info!(uid, "Signed out");
        auth.sign_out().await
    }

    /// Number of principals with at least one live session.
    pub fn len(&self) -> usize {
        self.prune();
        self.auth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose sessions are all gone.
    fn prune(&self) {
        self.auth.retain(|_, auth| auth.strong_count() > 0);
    }
}
