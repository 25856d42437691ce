//! Token-keyed store of in-flight sessions.
//!
//! Each respondent's `SessionState` lives behind its own `Mutex`, so two
//! respondents never contend on anything but the brief map lookup.  The
//! per-session lock only serialises one respondent's own overlapping
//! requests (double-clicks, reloads).
//!
//! Sessions untouched for longer than the idle limit are dropped; the sweep
//! runs from `open`/`checkout` at most once per limit interval.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use sp_core::SessionToken;

use crate::SessionState;

/// Shared handle to one respondent's session.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// Idle limit used by [`SessionStore::new`].
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(24 * 60 * 60);

struct Entry {
    handle:  SessionHandle,
    touched: Instant,
}

struct Sessions {
    entries:    HashMap<SessionToken, Entry>,
    last_sweep: Instant,
}

/// In-memory session registry.
pub struct SessionStore {
    sessions: Mutex<Sessions>,
    max_idle: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose sessions expire after `max_idle` without a request.
    pub fn with_max_idle(max_idle: Duration) -> Self {
        Self {
            sessions: Mutex::new(Sessions { entries: HashMap::new(), last_sweep: Instant::now() }),
            max_idle,
        }
    }

    pub fn max_idle(&self) -> Duration {
        self.max_idle
    }

    fn map(&self) -> MutexGuard<'_, Sessions> {
        // Entries are plain data; a panic elsewhere cannot leave the map torn.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Map guard, after an idle sweep if one is due.
    fn map_swept(&self) -> MutexGuard<'_, Sessions> {
        let mut map = self.map();
        if map.last_sweep.elapsed() >= self.max_idle {
            sweep(&mut map, self.max_idle);
        }
        map
    }

    /// Issue a fresh token with an empty session.
    pub fn open(&self) -> SessionToken {
        let token = SessionToken::new_v4();
        let entry = Entry { handle: SessionHandle::default(), touched: Instant::now() };
        self.map_swept().entries.insert(token, entry);
        debug!(%token, "session opened");
        token
    }

    /// Handle for `token`, creating an empty session on first interaction.
    pub fn checkout(&self, token: SessionToken) -> SessionHandle {
        let mut map = self.map_swept();
        let entry = map.entries.entry(token).or_insert_with(|| Entry {
            handle:  SessionHandle::default(),
            touched: Instant::now(),
        });
        entry.touched = Instant::now();
        Arc::clone(&entry.handle)
    }

    /// Existing handle for `token`, without creating one.
    pub fn get(&self, token: SessionToken) -> Option<SessionHandle> {
        let mut map = self.map();
        let entry = map.entries.get_mut(&token)?;
        entry.touched = Instant::now();
        Some(Arc::clone(&entry.handle))
    }

    /// Drop the session for `token`.
    pub fn discard(&self, token: SessionToken) -> Option<SessionHandle> {
        let removed = self.map().entries.remove(&token).map(|e| e.handle);
        if removed.is_some() {
            debug!(%token, "session discarded");
        }
        removed
    }

    /// Drop every session idle for at least `max_idle` and not currently
    /// checked out.  Returns how many were dropped.
    pub fn prune(&self, max_idle: Duration) -> usize {
        sweep(&mut self.map(), max_idle)
    }

    pub fn len(&self) -> usize {
        self.map().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().entries.is_empty()
    }
}

fn sweep(map: &mut Sessions, max_idle: Duration) -> usize {
    let before = map.entries.len();
    map.entries
        .retain(|_, e| e.touched.elapsed() < max_idle || Arc::strong_count(&e.handle) > 1);
    map.last_sweep = Instant::now();
    let dropped = before - map.entries.len();
    if dropped > 0 {
        debug!(dropped, remaining = map.entries.len(), "idle sessions pruned");
    }
    dropped
}

/// Lock a session handle, recovering the state if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, SessionState> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}
