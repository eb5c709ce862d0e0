// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! In-memory document store.
//!
//! Used by tests and local runs without Firebase. Profile documents live in
//! per-uid watch channels so subscriptions see every committed change in
//! order.

use super::{DocumentStore, ProfileWatch};
use crate::error::AppError;
use crate::models::{Program, UserProfile};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{watch, RwLock};

const WATCH_BUFFER: usize = 16;

#[derive(Default)]
pub struct MemoryStore {
    programs: RwLock<BTreeMap<String, Program>>,
    profiles: DashMap<String, watch::Sender<Option<UserProfile>>>,
    profile_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with programs, keyed by their id.
    pub async fn with_programs(programs: impl IntoIterator<Item = Program>) -> Self {
        let store = Self::new();
        for program in programs {
            store.put_program(program).await;
        }
        store
    }

    pub async fn put_program(&self, program: Program) {
        self.programs
            .write()
            .await
            .insert(program.id.clone(), program);
    }

    /// Overwrite a profile, as an administrative process would.
    pub fn put_profile(&self, profile: UserProfile) {
        self.profile_slot(&profile.uid).send_replace(Some(profile));
    }

    /// Remove a profile document.
    pub fn delete_profile(&self, uid: &str) {
        self.profile_slot(uid).send_replace(None);
    }

    /// Number of profile documents created through `create_profile_if_absent`.
    pub fn profile_writes(&self) -> usize {
        self.profile_writes.load(Ordering::SeqCst)
    }

    fn profile_slot(&self, uid: &str) -> watch::Sender<Option<UserProfile>> {
        self.profiles
            .entry(uid.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_program(&self, id: &str) -> Result<Option<Program>, AppError> {
        Ok(self.programs.read().await.get(id).cloned())
    }

    async fn list_programs(&self) -> Result<Vec<Program>, AppError> {
        Ok(self.programs.read().await.values().cloned().collect())
    }

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .profiles
            .get(uid)
            .and_then(|slot| slot.borrow().clone()))
    }

    async fn create_profile_if_absent(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, AppError> {
        let slot = self.profile_slot(&profile.uid);

        // send_if_modified holds the channel lock, so check-and-set is atomic
        let created = slot.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(profile.clone());
            true
        });

        if created {
            self.profile_writes.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(uid = %profile.uid, "Created profile");
        }

        let stored = slot.borrow().clone();
        stored.ok_or_else(|| AppError::Database("Profile vanished after create".to_string()))
    }

    async fn watch_profile(&self, uid: &str) -> Result<ProfileWatch, AppError> {
        let mut changes = self.profile_slot(uid).subscribe();
        let (watch, mut producer) = ProfileWatch::channel(uid, WATCH_BUFFER);

        tokio::spawn(async move {
            loop {
                let current = changes.borrow_and_update().clone();
                if producer.updates.send(Ok(current)).await.is_err() {
                    break;
                }

                tokio::select! {
                    _ = &mut producer.cancelled => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(watch)
    }
}
