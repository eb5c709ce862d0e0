// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Application configuration loaded from environment variables.
//!
//! Firebase settings are all-or-nothing: a partially filled set is treated
//! as absent.

use std::env;
use std::time::Duration;

/// Environment variables that together make up the Firebase web config.
pub const FIREBASE_FIELDS: [&str; 6] = [
    "FIREBASE_API_KEY",
    "FIREBASE_AUTH_DOMAIN",
    "FIREBASE_PROJECT_ID",
    "FIREBASE_STORAGE_BUCKET",
    "FIREBASE_MESSAGING_SENDER_ID",
    "FIREBASE_APP_ID",
];

const DEFAULT_PROFILE_TIMEOUT_SECS: u64 = 10;

/// Firebase project settings shared by the store, auth and functions clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl FirebaseConfig {
    /// Build from a variable lookup. Returns `None` unless every field is set.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values: Vec<Option<String>> = FIREBASE_FIELDS
            .iter()
            .map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
            .collect();

        let missing: Vec<&str> = FIREBASE_FIELDS
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();

        if missing.len() == FIREBASE_FIELDS.len() {
            tracing::info!("Firebase not configured, running in degraded mode");
            return None;
        }

        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                "Firebase configuration is incomplete, treating it as absent"
            );
            return None;
        }

        let mut values = values.into_iter().flatten();
        Some(Self {
            api_key: values.next()?,
            auth_domain: values.next()?,
            project_id: values.next()?,
            storage_bucket: values.next()?,
            messaging_sender_id: values.next()?,
            app_id: values.next()?,
        })
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Public URL of the site (CORS origin, absolute links)
    pub frontend_url: String,
    /// Name appended to page titles
    pub site_name: String,
    /// Development mode enables emulator wiring for the client services
    pub development: bool,
    /// Firebase web config (None when absent or incomplete)
    pub firebase: Option<FirebaseConfig>,
    /// Project for the privileged server-side Firestore handle
    pub admin_project_id: Option<String>,
    /// Region hosting callable functions
    pub functions_region: String,
    /// Upper bound on how long a session may stay in a loading state
    pub profile_timeout: Duration,
}

impl Config {
    /// Config for tests: degraded mode, short timeouts.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            site_name: "SEQHER".to_string(),
            development: false,
            firebase: None,
            admin_project_id: None,
            functions_region: "us-central1".to_string(),
            profile_timeout: Duration::from_secs(2),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile_timeout_secs = match lookup("PROFILE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("PROFILE_TIMEOUT_SECS", raw))?,
            None => DEFAULT_PROFILE_TIMEOUT_SECS,
        };

        let development = lookup("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        Ok(Self {
            port: match lookup("PORT") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PORT", raw))?,
                None => 8080,
            },
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            site_name: lookup("SITE_NAME").unwrap_or_else(|| "SEQHER".to_string()),
            development,
            firebase: FirebaseConfig::from_lookup(&lookup),
            admin_project_id: lookup("FIREBASE_ADMIN_PROJECT_ID")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            functions_region: lookup("FUNCTIONS_REGION")
                .unwrap_or_else(|| "us-central1".to_string()),
            profile_timeout: Duration::from_secs(profile_timeout_secs),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
