// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Per-visitor session: follows auth state, keeps the profile document in
//! sync and publishes the derived user.
//!
//! Each [`AuthSession`] owns one background task. The task feeds auth
//! changes, profile updates, commands and the loading deadline through
//! [`machine::SessionMachine`] and executes the effects it returns.

pub mod auth;
pub mod hub;
pub mod machine;

pub use auth::{AuthProvider, LocalAuth};
pub use hub::SessionHub;
pub use machine::SessionState;

use crate::backend::ServiceHandle;
use crate::db::{DocumentStore, ProfileUpdate, ProfileWatch};
use crate::error::AppError;
use crate::models::AppUser;
use machine::{Effect, SessionEvent, SessionMachine};
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

/// Default bound on how long a session may stay in `LoadingProfile`.
pub const DEFAULT_PROFILE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub profile_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            profile_timeout: DEFAULT_PROFILE_TIMEOUT,
        }
    }
}

/// Flattened view of a session for API consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub loading: bool,
    pub user: Option<AppUser>,
    pub is_admin: bool,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            state: state.clone(),
            loading: state.loading(),
            user: state.user().cloned(),
            is_admin: state.is_admin(),
        }
    }
}

#[derive(Debug)]
enum Command {
    Retry,
}

/// A running session. Dropping it stops the background task.
pub struct AuthSession {
    state: watch::Receiver<SessionState>,
    commands: mpsc::UnboundedSender<Command>,
    auth: ServiceHandle<dyn AuthProvider>,
    task: Option<JoinHandle<()>>,
    // Keeps the state channel open when no task was started
    _idle: Option<watch::Sender<SessionState>>,
}

impl AuthSession {
    /// Start following `auth`. Without an auth service the session is
    /// unauthenticated immediately and never changes.
    pub fn start(
        auth: ServiceHandle<dyn AuthProvider>,
        store: ServiceHandle<dyn DocumentStore>,
        options: SessionOptions,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();

        let Some(provider) = auth.ready().cloned() else {
            tracing::debug!(reason = ?auth, "Auth unavailable, session is unauthenticated");
            let (idle, state) = watch::channel(SessionState::Unauthenticated);
            return Self {
                state,
                commands,
                auth,
                task: None,
                _idle: Some(idle),
            };
        };

        let (state_tx, state) = watch::channel(SessionState::Initial);
        let runner = Runner {
            machine: SessionMachine::new(store.is_ready()),
            store,
            state: state_tx,
            profile_watch: None,
            store_call: None,
            deadline: None,
            options,
        };
        let task = tokio::spawn(runner.run(provider, command_rx));

        Self {
            state,
            commands,
            auth,
            task: Some(task),
            _idle: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.state.borrow())
    }

    /// Receiver that starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Wait until the session leaves the loading states.
    pub async fn settled(&self) -> SessionState {
        let mut rx = self.state.clone();
        let settled = rx.wait_for(|state| !state.loading()).await.map(|s| s.clone());
        match settled {
            Ok(state) => state,
            // Task is gone; report the last published state
            Err(_) => rx.borrow().clone(),
        }
    }

    /// Sign out through the auth service. A no-op when auth is unavailable.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        match self.auth.ready() {
            Some(auth) => auth.sign_out().await,
            None => Ok(()),
        }
    }

    /// Restart profile sync after a failure.
    pub fn retry(&self) {
        if self.commands.send(Command::Retry).is_err() {
            tracing::debug!("Retry ignored, session task not running");
        }
    }

    /// Stop the background task and wait for it to finish.
    pub async fn dispose(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

/// In-flight store request. Dropping it cancels the request.
type StoreCall = Pin<Box<dyn Future<Output = StoreOutcome> + Send>>;

enum StoreOutcome {
    Watching(ProfileWatch),
    Event(SessionEvent),
}

struct Runner {
    machine: SessionMachine,
    store: ServiceHandle<dyn DocumentStore>,
    state: watch::Sender<SessionState>,
    profile_watch: Option<ProfileWatch>,
    store_call: Option<StoreCall>,
    deadline: Option<Instant>,
    options: SessionOptions,
}

impl Runner {
    async fn run(
        mut self,
        auth: Arc<dyn AuthProvider>,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) {
        let mut auth_rx = auth.subscribe();
        let initial = auth_rx.borrow_and_update().clone();
        self.dispatch(SessionEvent::AuthChanged(initial));

        let mut auth_open = true;
        let mut commands_open = true;

        loop {
            let event = tokio::select! {
                changed = auth_rx.changed(), if auth_open => match changed {
                    Ok(()) => SessionEvent::AuthChanged(auth_rx.borrow_and_update().clone()),
                    Err(_) => {
                        tracing::debug!("Auth source closed");
                        auth_open = false;
                        continue;
                    }
                },
                outcome = next_outcome(&mut self.store_call) => {
                    self.store_call = None;
                    match outcome {
                        StoreOutcome::Watching(watch) => {
                            tracing::debug!(uid = %watch.uid(), "Watching profile");
                            self.profile_watch = Some(watch);
                            continue;
                        }
                        StoreOutcome::Event(event) => event,
                    }
                },
                update = next_update(&mut self.profile_watch) => match update {
                    Some((uid, Ok(profile))) => SessionEvent::ProfileChanged { uid, profile },
                    Some((uid, Err(e))) => SessionEvent::ProfileFailed {
                        uid,
                        message: e.to_string(),
                    },
                    None => {
                        let uid = self
                            .profile_watch
                            .take()
                            .map(|w| w.uid().to_string())
                            .unwrap_or_default();
                        if !self.machine.state().loading() {
                            // Settled sessions keep their last known profile
                            tracing::warn!(uid = %uid, "Profile subscription closed");
                            continue;
                        }
                        SessionEvent::ProfileFailed {
                            uid,
                            message: "profile subscription closed".to_string(),
                        }
                    }
                },
                command = commands.recv(), if commands_open => match command {
                    Some(Command::Retry) => SessionEvent::Retry,
                    None => {
                        commands_open = false;
                        continue;
                    }
                },
                _ = deadline_elapsed(self.deadline) => SessionEvent::TimedOut,
            };

            self.dispatch(event);
        }
    }

    /// Apply an event and every follow-up event its effects produce.
    fn dispatch(&mut self, event: SessionEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let effects = self.machine.handle(event);
            self.publish();

            for effect in effects {
                if let Some(follow_up) = self.execute(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// Perform an effect. Store requests are started here and finish as a
    /// branch of the run loop, so auth changes can pre-empt them.
    fn execute(&mut self, effect: Effect) -> Option<SessionEvent> {
        match effect {
            Effect::StopProfileWatch => {
                // Dropping the watch cancels its listener
                self.profile_watch = None;
                self.store_call = None;
                None
            }
            Effect::WatchProfile(uid) => {
                let store = match self.store.ready() {
                    Some(store) => store.clone(),
                    None => return Some(store_unavailable(uid)),
                };

                let deadline = self.load_deadline();
                self.store_call = Some(Box::pin(async move {
                    let result = timeout_at(deadline, store.watch_profile(&uid)).await;
                    match result {
                        Ok(Ok(watch)) => StoreOutcome::Watching(watch),
                        Ok(Err(e)) => StoreOutcome::Event(SessionEvent::ProfileFailed {
                            uid,
                            message: e.to_string(),
                        }),
                        Err(_) => StoreOutcome::Event(SessionEvent::TimedOut),
                    }
                }));
                None
            }
            Effect::CreateProfile(profile) => {
                let store = match self.store.ready() {
                    Some(store) => store.clone(),
                    None => return Some(store_unavailable(profile.uid)),
                };

                let deadline = self.load_deadline();
                self.store_call = Some(Box::pin(async move {
                    let uid = profile.uid.clone();
                    let result = timeout_at(deadline, store.create_profile_if_absent(&profile)).await;
                    let event = match result {
                        Ok(Ok(stored)) => SessionEvent::ProfileStored {
                            uid,
                            profile: stored,
                        },
                        Ok(Err(e)) => SessionEvent::ProfileFailed {
                            uid,
                            message: e.to_string(),
                        },
                        Err(_) => SessionEvent::TimedOut,
                    };
                    StoreOutcome::Event(event)
                }));
                None
            }
        }
    }

    /// Publish the machine state and arm or clear the loading deadline.
    fn publish(&mut self) {
        let next = self.machine.state().clone();

        let entering_load = match &next {
            SessionState::LoadingProfile { uid } => !matches!(
                &*self.state.borrow(),
                SessionState::LoadingProfile { uid: current } if current == uid
            ),
            _ => false,
        };
        if entering_load {
            self.deadline = Some(Instant::now() + self.options.profile_timeout);
        } else if !next.loading() {
            self.deadline = None;
        }

        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            match &next {
                SessionState::Failed { uid, message } => {
                    tracing::warn!(uid = %uid, error = %message, "Profile sync failed")
                }
                _ => tracing::info!(
                    from = current.status(),
                    to = next.status(),
                    "Session state changed"
                ),
            }
            *current = next.clone();
            true
        });
    }

    fn load_deadline(&self) -> Instant {
        self.deadline
            .unwrap_or_else(|| Instant::now() + self.options.profile_timeout)
    }
}

fn store_unavailable(uid: String) -> SessionEvent {
    SessionEvent::ProfileFailed {
        uid,
        message: "profile store unavailable".to_string(),
    }
}

/// Result of the in-flight store request. Pending forever when there is none.
async fn next_outcome(call: &mut Option<StoreCall>) -> StoreOutcome {
    match call {
        Some(call) => call.await,
        None => std::future::pending().await,
    }
}

/// Next update from the active watch. Pending forever when there is none.
async fn next_update(
    watch: &mut Option<ProfileWatch>,
) -> Option<(String, ProfileUpdate)> {
    match watch {
        Some(watch) => {
            let update = watch.recv().await?;
            Some((watch.uid().to_string(), update))
        }
        None => std::future::pending().await,
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
