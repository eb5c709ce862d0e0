// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Backend service handles (document store, auth, callable functions).
//!
//! Handles are built once at startup and passed explicitly. A handle is
//! either ready or carries the reason it is unavailable; callers fall back
//! to degraded behaviour instead of failing.

use crate::config::{Config, FirebaseConfig};
use crate::db::{DocumentStore, FirestoreDb};
use crate::services::firebase_auth::FirebaseTokenVerifier;
use crate::services::functions::{self, FunctionsClient};
use std::fmt;
use std::sync::Arc;

const DEFAULT_FIRESTORE_EMULATOR_HOST: &str = "127.0.0.1:8080";

/// Why a service handle is not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The required configuration is absent.
    NotConfigured,
    /// Interactive services are not built for render-only processes.
    NotInteractive,
    /// Construction was attempted and failed.
    InitFailed(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NotConfigured => write!(f, "not configured"),
            Unavailable::NotInteractive => write!(f, "not available in render-only mode"),
            Unavailable::InitFailed(e) => write!(f, "initialization failed: {}", e),
        }
    }
}

/// A backend service that may be unavailable.
pub enum ServiceHandle<T: ?Sized> {
    Ready(Arc<T>),
    Unavailable(Unavailable),
}

impl<T: ?Sized> Clone for ServiceHandle<T> {
    fn clone(&self) -> Self {
        match self {
            ServiceHandle::Ready(service) => ServiceHandle::Ready(service.clone()),
            ServiceHandle::Unavailable(reason) => ServiceHandle::Unavailable(reason.clone()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ServiceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceHandle::Ready(_) => write!(f, "Ready"),
            ServiceHandle::Unavailable(reason) => write!(f, "Unavailable({})", reason),
        }
    }
}

impl<T: ?Sized> ServiceHandle<T> {
    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            ServiceHandle::Ready(service) => Some(service),
            ServiceHandle::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ServiceHandle::Ready(_))
    }

    /// Prefer `self`, falling back to `other` when `self` is unavailable.
    pub fn or(&self, other: &Self) -> Self {
        if self.is_ready() {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// Turn a construction result into a handle, logging failures.
    fn from_init<E: fmt::Display>(service: &'static str, result: Result<Arc<T>, E>) -> Self {
        match result {
            Ok(handle) => ServiceHandle::Ready(handle),
            Err(e) => {
                tracing::error!(service, error = %e, "Backend service initialization failed");
                ServiceHandle::Unavailable(Unavailable::InitFailed(e.to_string()))
            }
        }
    }
}

/// Which kind of process is initializing the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Serves signed-in sessions; client services are built.
    Interactive,
    /// Renders pages only; client services are skipped.
    Prerender,
}

/// Services used on behalf of signed-in visitors.
#[derive(Clone, Debug)]
pub struct ClientServices {
    pub store: ServiceHandle<dyn DocumentStore>,
    pub auth: ServiceHandle<FirebaseTokenVerifier>,
    pub functions: ServiceHandle<FunctionsClient>,
}

impl ClientServices {
    pub fn unavailable(reason: Unavailable) -> Self {
        Self {
            store: ServiceHandle::Unavailable(reason.clone()),
            auth: ServiceHandle::Unavailable(reason.clone()),
            functions: ServiceHandle::Unavailable(reason),
        }
    }

    /// Build each service independently; one failing leaves the rest usable.
    pub async fn initialize(config: &Config, surface: Surface) -> Self {
        if surface != Surface::Interactive {
            tracing::debug!("Skipping client services outside interactive mode");
            return Self::unavailable(Unavailable::NotInteractive);
        }

        let Some(firebase) = &config.firebase else {
            return Self::unavailable(Unavailable::NotConfigured);
        };

        let store = ServiceHandle::from_init("firestore", connect_client_store(config, firebase).await);
        let auth = ServiceHandle::from_init(
            "auth",
            FirebaseTokenVerifier::new(&firebase.project_id).map(Arc::new),
        );
        let functions = ServiceHandle::from_init(
            "functions",
            connect_functions(config, firebase).map(Arc::new),
        );

        tracing::info!(
            store = store.is_ready(),
            auth = auth.is_ready(),
            functions = functions.is_ready(),
            emulators = config.development,
            "Client services initialized"
        );

        Self {
            store,
            auth,
            functions,
        }
    }
}

async fn connect_client_store(
    config: &Config,
    firebase: &FirebaseConfig,
) -> Result<Arc<dyn DocumentStore>, crate::error::AppError> {
    let db = if config.development {
        let host = std::env::var("FIRESTORE_EMULATOR_HOST")
            .unwrap_or_else(|_| DEFAULT_FIRESTORE_EMULATOR_HOST.to_string());
        FirestoreDb::new_emulator(&firebase.project_id, &host).await?
    } else {
        FirestoreDb::new(&firebase.project_id).await?
    };
    Ok(Arc::new(db))
}

fn connect_functions(config: &Config, firebase: &FirebaseConfig) -> anyhow::Result<FunctionsClient> {
    if config.development {
        FunctionsClient::new_emulator(
            &firebase.project_id,
            &config.functions_region,
            functions::EMULATOR_HOST,
        )
    } else {
        FunctionsClient::new(&firebase.project_id, &config.functions_region)
    }
}

/// Privileged server-side services. Never wired to emulators.
#[derive(Clone, Debug)]
pub struct AdminServices {
    pub store: ServiceHandle<dyn DocumentStore>,
}

impl AdminServices {
    pub async fn initialize(config: &Config) -> Self {
        let store = match &config.admin_project_id {
            None => ServiceHandle::Unavailable(Unavailable::NotConfigured),
            Some(project_id) => ServiceHandle::from_init(
                "firestore-admin",
                FirestoreDb::new(project_id)
                    .await
                    .map(|db| Arc::new(db) as Arc<dyn DocumentStore>),
            ),
        };

        tracing::info!(store = store.is_ready(), "Admin services initialized");
        Self { store }
    }
}

/// All backend handles for the process.
#[derive(Clone, Debug)]
pub struct Backend {
    pub client: ClientServices,
    pub admin: AdminServices,
}

impl Backend {
    pub async fn initialize(config: &Config, surface: Surface) -> Self {
        Self {
            client: ClientServices::initialize(config, surface).await,
            admin: AdminServices::initialize(config).await,
        }
    }

    /// Fully degraded backend.
    pub fn offline() -> Self {
        Self {
            client: ClientServices::unavailable(Unavailable::NotConfigured),
            admin: AdminServices {
                store: ServiceHandle::Unavailable(Unavailable::NotConfigured),
            },
        }
    }

    /// Store for page rendering: the admin store when present, else the
    /// client store.
    pub fn content_store(&self) -> ServiceHandle<dyn DocumentStore> {
        self.admin.store.or(&self.client.store)
    }
}
