// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Session state machine.
//!
//! Pure reducer: events in, state change plus effects out. The runtime in
//! `session/mod.rs` performs the effects and feeds their outcomes back as
//! events.

use crate::models::{AppUser, Principal, UserProfile};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SessionState {
    /// Waiting for the first auth-state notification.
    Initial,
    Unauthenticated,
    /// Signed in, profile document not yet seen.
    LoadingProfile { uid: String },
    Authenticated { user: AppUser },
    /// Signed in while the profile store is unavailable.
    AuthenticatedMinimal { user: AppUser },
    /// Profile sync failed; `retry` reopens it.
    Failed { uid: String, message: String },
}

impl SessionState {
    /// Short name for logs.
    pub fn status(&self) -> &'static str {
        match self {
            SessionState::Initial => "initial",
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::LoadingProfile { .. } => "loadingProfile",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::AuthenticatedMinimal { .. } => "authenticatedMinimal",
            SessionState::Failed { .. } => "failed",
        }
    }

    pub fn loading(&self) -> bool {
        matches!(
            self,
            SessionState::Initial | SessionState::LoadingProfile { .. }
        )
    }

    pub fn user(&self) -> Option<&AppUser> {
        match self {
            SessionState::Authenticated { user } | SessionState::AuthenticatedMinimal { user } => {
                Some(user)
            }
            _ => None,
        }
    }

    /// Admin only with a loaded profile; the minimal user never qualifies.
    pub fn is_admin(&self) -> bool {
        match self {
            SessionState::Authenticated { user } => user.is_admin(),
            _ => false,
        }
    }
}

/// Inputs to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AuthChanged(Option<Principal>),
    ProfileChanged {
        uid: String,
        profile: Option<UserProfile>,
    },
    ProfileStored {
        uid: String,
        profile: UserProfile,
    },
    ProfileFailed {
        uid: String,
        message: String,
    },
    TimedOut,
    Retry,
}

/// Work the runtime must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StopProfileWatch,
    WatchProfile(String),
    CreateProfile(UserProfile),
}

#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    principal: Option<Principal>,
    store_available: bool,
}

impl SessionMachine {
    pub fn new(store_available: bool) -> Self {
        Self {
            state: SessionState::Initial,
            principal: None,
            store_available,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::AuthChanged(None) => {
                self.principal = None;
                self.state = SessionState::Unauthenticated;
                vec![Effect::StopProfileWatch]
            }
            SessionEvent::AuthChanged(Some(principal)) => self.signed_in(principal),
            SessionEvent::ProfileChanged { uid, profile } => {
                let Some(principal) = self.live_principal(&uid) else {
                    return Vec::new();
                };
                match profile {
                    Some(profile) => {
                        self.state = SessionState::Authenticated {
                            user: AppUser::project(&principal, Some(&profile)),
                        };
                        Vec::new()
                    }
                    None => vec![Effect::CreateProfile(UserProfile::new_default(&principal))],
                }
            }
            SessionEvent::ProfileStored { uid, profile } => {
                let Some(principal) = self.live_principal(&uid) else {
                    return Vec::new();
                };
                self.state = SessionState::Authenticated {
                    user: AppUser::project(&principal, Some(&profile)),
                };
                Vec::new()
            }
            SessionEvent::ProfileFailed { uid, message } => {
                if self.live_principal(&uid).is_none() {
                    return Vec::new();
                }
                self.fail(uid, message)
            }
            SessionEvent::TimedOut => match &self.state {
                SessionState::LoadingProfile { uid } => {
                    let uid = uid.clone();
                    self.fail(uid, "profile load timed out".to_string())
                }
                _ => Vec::new(),
            },
            SessionEvent::Retry => match (&self.state, &self.principal) {
                (SessionState::Failed { .. }, Some(principal)) => {
                    let uid = principal.uid.clone();
                    self.state = SessionState::LoadingProfile { uid: uid.clone() };
                    vec![Effect::StopProfileWatch, Effect::WatchProfile(uid)]
                }
                _ => Vec::new(),
            },
        }
    }

    fn signed_in(&mut self, principal: Principal) -> Vec<Effect> {
        let settled_or_loading = !matches!(
            self.state,
            SessionState::Initial | SessionState::Unauthenticated
        );
        if settled_or_loading && self.principal.as_ref() == Some(&principal) {
            return Vec::new();
        }

        let uid = principal.uid.clone();
        self.principal = Some(principal);

        if !self.store_available {
            if let Some(principal) = &self.principal {
                self.state = SessionState::AuthenticatedMinimal {
                    user: AppUser::project(principal, None),
                };
            }
            return vec![Effect::StopProfileWatch];
        }

        self.state = SessionState::LoadingProfile { uid: uid.clone() };
        vec![Effect::StopProfileWatch, Effect::WatchProfile(uid)]
    }

    /// The current principal, if `uid` still refers to it and the session
    /// has not failed.
    fn live_principal(&self, uid: &str) -> Option<Principal> {
        if matches!(self.state, SessionState::Failed { .. }) {
            return None;
        }
        self.principal.clone().filter(|principal| principal.uid == uid)
    }

    fn fail(&mut self, uid: String, message: String) -> Vec<Effect> {
        self.state = SessionState::Failed { uid, message };
        vec![Effect::StopProfileWatch]
    }
}
