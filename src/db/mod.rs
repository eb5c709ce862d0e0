// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Database layer (Firestore, plus an in-memory store for tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Program, UserProfile};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// Collection names as constants.
pub mod collections {
    pub const PROGRAMS: &str = "programs";
    pub const USERS: &str = "users";
}

/// One notification from a profile subscription: the current document, or
/// `None` when it does not exist.
pub type ProfileUpdate = Result<Option<UserProfile>, AppError>;

/// Document store operations used by pages and sessions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one program by key.
    async fn get_program(&self, id: &str) -> Result<Option<Program>, AppError>;

    /// Fetch every program in the collection.
    async fn list_programs(&self) -> Result<Vec<Program>, AppError>;

    /// Fetch a profile by principal id.
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError>;

    /// Create the profile unless one already exists.
    ///
    /// Returns whatever profile is stored after the call, which is the
    /// existing one when another writer got there first.
    async fn create_profile_if_absent(&self, profile: &UserProfile)
        -> Result<UserProfile, AppError>;

    /// Subscribe to a profile document. The first update carries the
    /// current state; later ones follow each committed change.
    async fn watch_profile(&self, uid: &str) -> Result<ProfileWatch, AppError>;
}

/// Live subscription to a profile document.
///
/// Dropping the watch cancels the underlying listener.
pub struct ProfileWatch {
    uid: String,
    updates: mpsc::Receiver<ProfileUpdate>,
    _cancel: oneshot::Sender<()>,
}

impl ProfileWatch {
    /// Create a watch and the producer half that feeds it.
    ///
    /// The producer should stop once `cancelled` resolves.
    pub fn channel(uid: &str, buffer: usize) -> (Self, ProfileWatchProducer) {
        let (tx, rx) = mpsc::channel(buffer);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        (
            Self {
                uid: uid.to_string(),
                updates: rx,
                _cancel: cancel_tx,
            },
            ProfileWatchProducer {
                updates: tx,
                cancelled: cancel_rx,
            },
        )
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Next update, or `None` once the producer has gone away.
    pub async fn recv(&mut self) -> Option<ProfileUpdate> {
        self.updates.recv().await
    }
}

/// Sending half of a [`ProfileWatch`].
pub struct ProfileWatchProducer {
    pub updates: mpsc::Sender<ProfileUpdate>,
    pub cancelled: oneshot::Receiver<()>,
}
