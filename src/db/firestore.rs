// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Programs (read-only content)
//! - Users (profile documents, created once per principal)

use super::{DocumentStore, ProfileWatch, ProfileWatchProducer};
use crate::db::collections;
use crate::error::AppError;
use crate::models::{Program, UserProfile};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{
    FirestoreListenEvent, FirestoreListenerTarget, FirestoreMemListenStateStorage,
};

const PROFILE_TARGET: FirestoreListenerTarget = FirestoreListenerTarget::new(1_u32);
const WATCH_BUFFER: usize = 16;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Connect with application default credentials.
    ///
    /// This is the privileged server-side handle; no emulator wiring.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Connect to the Firestore emulator with unauthenticated access.
    pub async fn new_emulator(project_id: &str, emulator_host: &str) -> Result<Self, AppError> {
        tracing::info!(
            host = emulator_host,
            "Using unauthenticated connection for Firestore Emulator"
        );

        // The emulator accepts any bearer token.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string())
            .with_firebase_api_url(format!("http://{}", emulator_host));

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Profile Listener ───────────────────────────────────────

    async fn spawn_profile_listener(
        &self,
        uid: &str,
        producer: ProfileWatchProducer,
    ) -> Result<(), AppError> {
        let ProfileWatchProducer { updates, cancelled } = producer;

        let mut listener = self
            .client
            .create_listener(FirestoreMemListenStateStorage::new())
            .await
            .map_err(|e| AppError::Database(format!("Failed to create listener: {}", e)))?;

        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .batch_listen([uid.to_string()])
            .add_target(PROFILE_TARGET, &mut listener)
            .map_err(|e| AppError::Database(format!("Failed to add listen target: {}", e)))?;

        let listen_uid = uid.to_string();
        listener
            .start(move |event| {
                let updates = updates.clone();
                let uid = listen_uid.clone();
                async move {
                    let update = match event {
                        FirestoreListenEvent::DocumentChange(ref change) => {
                            change.document.as_ref().map(|doc| {
                                firestore::FirestoreDb::deserialize_doc_to::<UserProfile>(doc)
                                    .map(Some)
                                    .map_err(|e| AppError::Database(e.to_string()))
                            })
                        }
                        FirestoreListenEvent::DocumentDelete(_)
                        | FirestoreListenEvent::DocumentRemove(_) => Some(Ok(None)),
                        _ => None,
                    };

                    if let Some(update) = update {
                        tracing::debug!(uid = %uid, "Profile document changed");
                        // A closed receiver means the watch was dropped
                        let _ = updates.send(update).await;
                    }
                    Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
                }
            })
            .await
            .map_err(|e| AppError::Database(format!("Failed to start listener: {}", e)))?;

        let uid = uid.to_string();
        tokio::spawn(async move {
            let _ = cancelled.await;
            if let Err(e) = listener.shutdown().await {
                tracing::warn!(uid = %uid, error = %e, "Profile listener shutdown failed");
            } else {
                tracing::debug!(uid = %uid, "Profile listener stopped");
            }
        });

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    // ─── Program Operations ──────────────────────────────────────

    async fn get_program(&self, id: &str) -> Result<Option<Program>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::PROGRAMS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_programs(&self) -> Result<Vec<Program>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::PROGRAMS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Profile Operations ─────────────────────────────────

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Uses a Firestore create, which fails when the document exists. A
    /// conflict means another session created it first; its copy wins.
    async fn create_profile_if_absent(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, AppError> {
        let result: Result<UserProfile, FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await;

        match result {
            Ok(created) => {
                tracing::info!(uid = %profile.uid, "Created user profile");
                Ok(created)
            }
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::info!(
                    uid = %profile.uid,
                    "Profile created concurrently, using stored copy"
                );
                self.get_profile(&profile.uid).await?.ok_or_else(|| {
                    AppError::Database(format!(
                        "Profile {} conflicted on create but is missing",
                        profile.uid
                    ))
                })
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Reads the document once for the initial state (listen targets emit
    /// nothing for a missing document), then forwards listener changes.
    async fn watch_profile(&self, uid: &str) -> Result<ProfileWatch, AppError> {
        let (watch, producer) = ProfileWatch::channel(uid, WATCH_BUFFER);

        let initial = self.get_profile(uid).await?;
        producer
            .updates
            .send(Ok(initial))
            .await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Profile watch closed early")))?;

        self.spawn_profile_listener(uid, producer).await?;

        Ok(watch)
    }
}
