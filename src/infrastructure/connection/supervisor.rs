//! Lifecycle supervision for stateful dependencies.
//!
//! A [`ConnectionSupervisor`] owns one dependency handle (database pool,
//! cache connection) for the whole process and drives it through:
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Ready
//!                               |
//!                               +--err, attempts < max--> Disconnected --(delay)--> Connecting
//!                               +--err, attempts = max--> Failed(attempts)   (terminal)
//! ```
//!
//! `connect()` calls are serialized per supervisor, so at most one physical
//! connection attempt is in flight. `disconnect()` releases the handle once;
//! repeated calls are no-ops.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use super::retry::{self, RetryPolicy};

/// Observable state of a supervised dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "attempts", rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
    Failed(u32),
}

/// Errors raised by connectors and supervisors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A single connection attempt failed.
    #[error("{dependency} connection attempt failed: {reason}")]
    Connect {
        dependency: &'static str,
        reason: String,
    },

    /// Every allowed attempt failed; the supervisor is now terminally failed.
    #[error("{dependency} unreachable after {attempts} attempts: {last_error}")]
    ConnectionExhausted {
        dependency: &'static str,
        attempts: u32,
        last_error: String,
    },

    /// The handle was requested before the dependency became ready.
    #[error("{0} is not connected")]
    NotReady(&'static str),
}

/// Establishes and releases connections to one kind of dependency.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Shared client handle; clones refer to the same underlying connection(s).
    type Handle: Clone + Send + Sync + 'static;

    /// Short name used in logs and metrics (`"postgres"`, `"redis"`).
    fn dependency(&self) -> &'static str;

    /// Makes one connection attempt.
    async fn connect(&self) -> Result<Self::Handle, ConnectionError>;

    /// Releases a handle obtained from [`Connector::connect`].
    async fn disconnect(&self, handle: Self::Handle);
}

/// Owns a dependency handle and its [`ConnectionState`].
pub struct ConnectionSupervisor<C: Connector> {
    connector: C,
    policy: RetryPolicy,
    state: watch::Sender<ConnectionState>,
    handle: Mutex<Option<C::Handle>>,
}

impl<C: Connector> ConnectionSupervisor<C> {
    pub fn new(connector: C, policy: RetryPolicy) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connector,
            policy,
            state,
            handle: Mutex::new(None),
        }
    }

    pub fn dependency(&self) -> &'static str {
        self.connector.dependency()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// Receiver that observes every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Connects with bounded retry, or returns the existing handle when ready.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::ConnectionExhausted`] once `max_attempts`
    /// consecutive attempts have failed, and on every later call: the failed
    /// state is terminal.
    pub async fn connect(&self) -> Result<C::Handle, ConnectionError> {
        let mut slot = self.handle.lock().await;

        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        let dependency = self.connector.dependency();

        if let ConnectionState::Failed(attempts) = self.state() {
            return Err(ConnectionError::ConnectionExhausted {
                dependency,
                attempts,
                last_error: "dependency previously failed".to_string(),
            });
        }

        let connector = &self.connector;
        let state = &self.state;
        let max_attempts = self.policy.max_attempts;

        let outcome = retry::attempt(self.policy, |attempt| async move {
            state.send_replace(ConnectionState::Connecting);
            debug!("Connecting to {} (attempt {}/{})", dependency, attempt, max_attempts);

            match connector.connect().await {
                Ok(handle) => Ok(handle),
                Err(e) => {
                    metrics::counter!(
                        "connection_attempts_total",
                        "dependency" => dependency,
                        "outcome" => "failure"
                    )
                    .increment(1);
                    warn!(
                        "{} connection attempt {}/{} failed: {}",
                        dependency, attempt, max_attempts, e
                    );
                    if attempt < max_attempts {
                        state.send_replace(ConnectionState::Disconnected);
                    }
                    Err(e)
                }
            }
        })
        .await;

        match outcome {
            Ok(handle) => {
                metrics::counter!(
                    "connection_attempts_total",
                    "dependency" => dependency,
                    "outcome" => "success"
                )
                .increment(1);
                info!("✓ Connected to {}", dependency);
                *slot = Some(handle.clone());
                self.state.send_replace(ConnectionState::Ready);
                Ok(handle)
            }
            Err(exhausted) => {
                error!(
                    "{} unreachable after {} attempts: {}",
                    dependency, exhausted.attempts, exhausted.last_error
                );
                self.state
                    .send_replace(ConnectionState::Failed(exhausted.attempts));
                Err(ConnectionError::ConnectionExhausted {
                    dependency,
                    attempts: exhausted.attempts,
                    last_error: exhausted.last_error.to_string(),
                })
            }
        }
    }

    /// Returns the live handle without connecting.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::NotReady`] unless the state is `Ready`.
    pub async fn handle(&self) -> Result<C::Handle, ConnectionError> {
        self.handle
            .lock()
            .await
            .clone()
            .ok_or(ConnectionError::NotReady(self.connector.dependency()))
    }

    /// Releases the handle if one is held. Safe to call any number of times.
    ///
    /// A state left at `Connecting` by a cancelled [`connect`](Self::connect)
    /// goes back to `Disconnected`; `Failed` is kept.
    pub async fn disconnect(&self) {
        let mut slot = self.handle.lock().await;

        match slot.take() {
            Some(handle) => {
                self.connector.disconnect(handle).await;
                self.state.send_replace(ConnectionState::Disconnected);
                info!("Disconnected from {}", self.connector.dependency());
            }
            None => {
                self.state.send_if_modified(|state| {
                    let interrupted = *state == ConnectionState::Connecting;
                    if interrupted {
                        *state = ConnectionState::Disconnected;
                    }
                    interrupted
                });
                debug!(
                    "{} already disconnected, nothing to release",
                    self.connector.dependency()
                );
            }
        }
    }
}

/// Read-only view of a supervised dependency, used for health reporting.
pub trait DependencyStatus: Send + Sync {
    fn dependency(&self) -> &'static str;
    fn state(&self) -> ConnectionState;
}

impl<C: Connector> DependencyStatus for ConnectionSupervisor<C> {
    fn dependency(&self) -> &'static str {
        self.connector.dependency()
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}
