//! Session state shared by every call made through one client
//!
//! A [`SessionHolder`] owns at most one [`Session`]. The check-and-refresh
//! sequence runs under a single mutex so concurrent callers never see a
//! half-replaced token; the network call that uses the token happens after
//! the lock is released.

use crate::error::UniFiError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Token plus the instant it was issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    created_at: Instant,
    ttl: Duration,
}

impl Session {
    /// New session issued at `created_at`
    pub fn new(token: impl Into<String>, created_at: Instant, ttl: Duration) -> Self {
        Self {
            token: token.into(),
            created_at,
            ttl,
        }
    }

    /// Opaque session token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Issue instant
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// A session is valid while `now - created_at < ttl`
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < self.ttl
    }
}

/// Mutex-guarded optional session
#[derive(Debug)]
pub struct SessionHolder {
    ttl: Duration,
    current: Mutex<Option<Session>>,
}

impl SessionHolder {
    /// Empty holder whose sessions live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: Mutex::new(None),
        }
    }

    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // Sessions are only ever swapped whole, so a poisoned lock still holds a
    // coherent value.
    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return a valid token, calling `authenticate` first if the session is
    /// absent or expired
    ///
    /// `authenticate` runs inside the critical section, so concurrent
    /// callers discovering the same expired session trigger one refresh.
    pub fn token_or_refresh<F>(&self, authenticate: F) -> Result<String, UniFiError>
    where
        F: FnOnce() -> Result<String, UniFiError>,
    {
        let mut current = self.lock();
        let now = Instant::now();

        if let Some(session) = current.as_ref().filter(|s| s.is_valid_at(now)) {
            return Ok(session.token.clone());
        }

        if current.is_some() {
            info!("Session expired, creating new session");
        }
        let token = authenticate()?;
        *current = Some(Session::new(token.clone(), Instant::now(), self.ttl));
        debug!("New session created");
        Ok(token)
    }

    /// Drop the held session; the next call re-authenticates
    pub fn clear(&self) -> Option<Session> {
        self.lock().take()
    }

    /// Copy of the held session, if any
    pub fn snapshot(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// Whether a session is held (valid or not)
    pub fn is_present(&self) -> bool {
        self.lock().is_some()
    }
}
