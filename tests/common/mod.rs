// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use seqher_site::backend::{Backend, ServiceHandle};
use seqher_site::config::Config;
use seqher_site::db::{DocumentStore, FirestoreDb, MemoryStore};
use seqher_site::models::Program;
use seqher_site::routes::create_router;
use seqher_site::services::{AssetTable, FirebaseTokenVerifier};
use seqher_site::AppState;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[allow(dead_code)]
pub const TEST_PROJECT: &str = "seqher-test";
#[allow(dead_code)]
pub const TEST_KID: &str = "test-key-1";

#[allow(dead_code)]
const PRIVATE_KEY_PEM: &[u8] = include_bytes!("../fixtures/test_rsa_private.pem");
#[allow(dead_code)]
const PUBLIC_KEY_PEM: &[u8] = include_bytes!("../fixtures/test_rsa_public.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection against the emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    let host = std::env::var("FIRESTORE_EMULATOR_HOST").expect("FIRESTORE_EMULATOR_HOST");
    FirestoreDb::new_emulator(TEST_PROJECT, &host)
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Verifier that trusts the fixture key pair.
#[allow(dead_code)]
pub fn test_verifier() -> FirebaseTokenVerifier {
    let key = DecodingKey::from_rsa_pem(PUBLIC_KEY_PEM).expect("fixture public key");
    FirebaseTokenVerifier::new_with_static_key(TEST_PROJECT, TEST_KID, key)
        .expect("static verifier")
}

/// Sign an ID token for `uid` the way Firebase Authentication would.
#[allow(dead_code)]
pub fn create_test_id_token(uid: &str, email: Option<&str>, name: Option<&str>) -> String {
    #[derive(Serialize)]
    struct Claims<'a> {
        iss: String,
        aud: &'a str,
        sub: &'a str,
        iat: u64,
        exp: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'a str>,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = Claims {
        iss: format!("https://securetoken.google.com/{}", TEST_PROJECT),
        aud: TEST_PROJECT,
        sub: uid,
        iat: now,
        exp: now + 3600,
        email,
        name,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());

    encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM).expect("fixture private key"),
    )
    .unwrap()
}

/// A handful of programs, one with an image from the built-in table.
#[allow(dead_code)]
pub fn sample_programs() -> Vec<Program> {
    vec![
        Program {
            id: "clean-water".to_string(),
            title: "Clean Water for Schools".to_string(),
            summary: "Wells and filters for rural schools.".to_string(),
            description: "We drill wells & maintain them with local crews.".to_string(),
            sdg_goals: vec![6, 3],
            image_id: Some("program-water".to_string()),
        },
        Program {
            id: "girls-education".to_string(),
            title: "Girls' Education".to_string(),
            summary: "Scholarships and mentoring.".to_string(),
            description: "Tuition, books and mentoring for secondary school.".to_string(),
            sdg_goals: vec![4, 5],
            image_id: None,
        },
    ]
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
}

/// App with a working in-memory store and the fixture token verifier.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::with_programs(sample_programs()).await);
    build_app(Some(store.clone()), true, store)
}

/// App whose auth works but whose document store is unavailable.
#[allow(dead_code)]
pub async fn create_test_app_without_store() -> TestApp {
    build_app(None, true, Arc::new(MemoryStore::new()))
}

/// Fully degraded app: no Firebase configuration at all.
#[allow(dead_code)]
pub fn create_degraded_app() -> TestApp {
    build_app(None, false, Arc::new(MemoryStore::new()))
}

#[allow(dead_code)]
fn build_app(store: Option<Arc<MemoryStore>>, auth: bool, handle: Arc<MemoryStore>) -> TestApp {
    let mut backend = Backend::offline();
    if let Some(store) = store {
        let store: Arc<dyn DocumentStore> = store;
        backend.client.store = ServiceHandle::Ready(store);
    }
    if auth {
        backend.client.auth = ServiceHandle::Ready(Arc::new(test_verifier()));
    }

    let state = Arc::new(AppState::new(
        Config::test_default(),
        backend,
        AssetTable::builtin().unwrap(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store: handle,
    }
}
