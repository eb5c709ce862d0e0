// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Session state for the calling visitor.

use crate::error::Result;
use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::CurrentPrincipal;
use crate::session::machine::SessionState;
use crate::session::SessionSnapshot;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use futures_util::stream::{self, Stream};
use std::sync::Arc;

/// Session routes. Identity comes from [`CurrentPrincipal`], set by the
/// auth middleware in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/session/events", get(session_events))
        .route("/api/session/sign-out", post(sign_out))
}

/// Snapshot once profile loading has settled.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
) -> Json<SessionSnapshot> {
    let session = state.start_session(principal);
    let settled: SessionState = session.settled().await;
    session.dispose().await;

    Json(SessionSnapshot::from(&settled))
}

/// One `session` event with the current snapshot, then one per change.
async fn session_events(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let session = state.start_session(principal);
    let updates = session.subscribe();

    // The session lives as long as the stream
    let events = stream::unfold(
        (session, updates, true),
        |(session, mut updates, first)| async move {
            if !first {
                updates.changed().await.ok()?;
            }
            let snapshot = SessionSnapshot::from(&*updates.borrow_and_update());
            let event = Event::default().event("session").json_data(snapshot);
            Some((event, (session, updates, false)))
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Sign the caller out of every live session and expire the session cookie.
async fn sign_out(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<CurrentPrincipal>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    let principal = principal.require()?;
    state.sessions.sign_out(&principal.uid).await?;

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}
