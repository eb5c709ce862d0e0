// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Firebase ID token authentication middleware.

use crate::error::AppError;
use crate::models::Principal;
use crate::services::firebase_auth::{bearer_token, TokenError};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie carrying the ID token for server-rendered requests.
pub const SESSION_COOKIE: &str = "__session";

/// The verified caller, if any. Inserted into request extensions by
/// [`identify_principal`].
#[derive(Debug, Clone, Default)]
pub struct CurrentPrincipal(pub Option<Principal>);

impl CurrentPrincipal {
    /// The principal, or `Unauthorized` for anonymous requests.
    pub fn require(self) -> Result<Principal, AppError> {
        self.0.ok_or(AppError::Unauthorized)
    }
}

/// Middleware that verifies an ID token when one is presented.
///
/// Anonymous requests pass through with no principal, as do all requests
/// when the auth service is unavailable. A token that fails verification is
/// rejected.
pub async fn identify_principal(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => Some(cookie.value().to_string()),
        None => request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string),
    };

    let principal = match (token, state.backend.client.auth.ready()) {
        (Some(token), Some(verifier)) => match verifier.verify_id_token(&token).await {
            Ok(principal) => Some(principal),
            Err(TokenError::Rejected(reason)) => {
                tracing::debug!(reason = %reason, "Rejected ID token");
                return Err(AppError::InvalidToken);
            }
            Err(TokenError::Transient(reason)) => {
                tracing::warn!(reason = %reason, "ID token verification unavailable");
                return Err(AppError::Unavailable("token verification".to_string()));
            }
        },
        (Some(_), None) => {
            tracing::debug!("Auth unavailable, treating request as anonymous");
            None
        }
        (None, _) => None,
    };

    request.extensions_mut().insert(CurrentPrincipal(principal));

    Ok(next.run(request).await)
}
