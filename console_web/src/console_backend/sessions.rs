use catalog::QueryLabSession;
use common::config::components::server::DEFAULT_SESSION_TTL_SECS;
use parking_lot::Mutex;
use pipeline::{EditorView, NodeConfigEditor};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct Entry<T> {
    value: T,
    touched: Instant,
}

/// Server-side sessions keyed by a random id. Every access refreshes the
/// session; one left untouched for longer than `ttl` is dropped on the next
/// `open` or lookup. The lock is never held across an await, so callers
/// copy what they need out of the value first.
pub struct SessionMap<T> {
    kind: &'static str,
    ttl: Duration,
    inner: Arc<Mutex<HashMap<Uuid, Entry<T>>>>,
}

impl<T> Clone for SessionMap<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            ttl: self.ttl,
            inner: self.inner.clone(),
        }
    }
}

impl<T> SessionMap<T> {
    pub fn new(kind: &'static str, ttl: Duration) -> Self {
        Self {
            kind,
            ttl,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn open(&self, value: T) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut g = self.inner.lock();
        self.sweep(&mut g, now);
        g.insert(id, Entry { value, touched: now });
        log::debug!("opened {} session {id}", self.kind);
        id
    }

    /// Run `f` against the session's value, if the session is still open.
    pub fn with<R>(&self, id: Uuid, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.with_at(id, Instant::now(), f)
    }

    fn with_at<R>(&self, id: Uuid, now: Instant, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut g = self.inner.lock();
        self.sweep(&mut g, now);
        let entry = g.get_mut(&id)?;
        entry.touched = now;
        Some(f(&mut entry.value))
    }

    pub fn close(&self, id: Uuid) -> Option<T> {
        let entry = self.inner.lock().remove(&id);
        if entry.is_some() {
            log::debug!("closed {} session {id}", self.kind);
        }
        entry.map(|e| e.value)
    }

    /// Drops every session idle for longer than the ttl as of `now`.
    pub fn evict_idle(&self, now: Instant) -> usize {
        self.sweep(&mut self.inner.lock(), now)
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, Entry<T>>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, e| now.saturating_duration_since(e.touched) <= self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            log::info!("evicted {evicted} idle {} sessions", self.kind);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Open configuration editors. They hold unsaved credentials, so idle ones
/// must not outlive the ttl.
pub type EditorSessions = SessionMap<NodeConfigEditor>;

/// SQL lab sessions; each keeps only its latest run's outcome.
pub type QuerySessions = SessionMap<QueryLabSession>;

impl Default for EditorSessions {
    fn default() -> Self {
        Self::new("editor", Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl Default for QuerySessions {
    fn default() -> Self {
        Self::new("query", Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl EditorSessions {
    pub fn view(&self, id: Uuid) -> Option<EditorView> {
        self.with(id, |editor| editor.masked_view())
    }
}
