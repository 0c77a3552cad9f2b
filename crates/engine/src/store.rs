//! Session-scoped storage for generated suggestion sets.
//!
//! Each generate call stores its result under a fresh opaque handle, and an
//! export reads only the set for the handle it is given. Callers never see
//! each other's results.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::SuggestionRecord;

pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(Uuid);

impl SessionHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionHandle {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Default)]
struct Sessions {
    by_handle: HashMap<SessionHandle, Arc<Vec<SuggestionRecord>>>,
    /// Insertion order, oldest first.
    order: VecDeque<SessionHandle>,
}

/// Bounded map of handle -> suggestion set. The oldest set is evicted once
/// `capacity` is reached.
#[derive(Clone)]
pub struct SuggestionStore {
    inner: Arc<Mutex<Sessions>>,
    capacity: usize,
}

impl SuggestionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&self, suggestions: Vec<SuggestionRecord>) -> SessionHandle {
        let handle = SessionHandle::new();
        let mut sessions = self.inner.lock();

        while sessions.order.len() >= self.capacity {
            match sessions.order.pop_front() {
                Some(oldest) => {
                    sessions.by_handle.remove(&oldest);
                    debug!("evicted suggestion set {oldest}");
                }
                None => break,
            }
        }

        sessions.by_handle.insert(handle, Arc::new(suggestions));
        sessions.order.push_back(handle);
        handle
    }

    pub fn get(&self, handle: &SessionHandle) -> Option<Arc<Vec<SuggestionRecord>>> {
        self.inner.lock().by_handle.get(handle).cloned()
    }

    pub fn remove(&self, handle: &SessionHandle) -> Option<Arc<Vec<SuggestionRecord>>> {
        let mut sessions = self.inner.lock();
        let removed = sessions.by_handle.remove(handle);
        if removed.is_some() {
            sessions.order.retain(|h| h != handle);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SuggestionStore {
    fn default() -> Self {
        Self::new()
    }
}
