// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Client for Firebase callable functions.
//!
//! Callables take `{"data": ..}` and answer with `{"result": ..}` or
//! `{"error": {"status": .., "message": ..}}`.

use crate::error::AppError;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const EMULATOR_HOST: &str = "127.0.0.1:5001";

/// Callable functions client bound to one project and region.
#[derive(Clone)]
pub struct FunctionsClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct CallRequest<'a, T> {
    data: &'a T,
}

#[derive(Deserialize)]
struct CallResponse<R> {
    result: Option<R>,
    error: Option<CallError>,
}

#[derive(Debug, Deserialize)]
struct CallError {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: String,
}

impl FunctionsClient {
    /// Production endpoint: `https://{region}-{project}.cloudfunctions.net`.
    pub fn new(project_id: &str, region: &str) -> anyhow::Result<Self> {
        Self::with_base_url(format!(
            "https://{}-{}.cloudfunctions.net",
            region, project_id
        ))
    }

    /// Functions emulator endpoint: `http://{host}/{project}/{region}`.
    pub fn new_emulator(project_id: &str, region: &str, host: &str) -> anyhow::Result<Self> {
        tracing::info!(host, "Using Functions Emulator");
        Self::with_base_url(format!("http://{}/{}/{}", host, project_id, region))
    }

    /// Point the client at an arbitrary base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building functions HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(name))
    }

    /// Invoke a callable function and decode its result.
    pub async fn call<T, R>(&self, name: &str, data: &T) -> Result<R, AppError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let url = self.function_url(name);
        tracing::debug!(function = name, url = %url, "Calling function");

        let response = self
            .http_client
            .post(&url)
            .json(&CallRequest { data })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("function {name}"))
                } else {
                    AppError::Functions(format!("{name}: {e}"))
                }
            })?;

        let status = response.status();
        let body: CallResponse<R> = response
            .json()
            .await
            .map_err(|e| AppError::Functions(format!("{name}: invalid response ({status}): {e}")))?;

        if let Some(error) = body.error {
            tracing::warn!(
                function = name,
                status = ?error.status,
                message = %error.message,
                "Function returned an error"
            );
            return Err(AppError::Functions(format!(
                "{name}: {} {}",
                error.status.as_deref().unwrap_or("UNKNOWN"),
                error.message
            )));
        }

        if !status.is_success() {
            return Err(AppError::Functions(format!("{name}: HTTP {status}")));
        }

        body.result
            .ok_or_else(|| AppError::Functions(format!("{name}: response has no result")))
    }
}
