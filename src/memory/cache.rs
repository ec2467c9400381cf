//! Bounded LRU cache of live chat sessions
//!
//! The cache is a performance layer only: the file store stays the source
//! of truth, and a cache miss means "reload from disk". Capacity is fixed
//! at construction; inserting past capacity evicts the least-recently-used
//! session, which is safe because every turn persists before caching.

use super::session::ChatSession;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Capacity-limited session cache with LRU eviction.
pub struct SessionCache {
    inner: Arc<RwLock<CacheInner>>,
}

struct CacheInner {
    map: HashMap<String, ChatSession>,
    /// LRU order: front = oldest, back = newest
    order: VecDeque<String>,
    capacity: usize,
}

impl SessionCache {
    /// Create a cache with the given capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                map: HashMap::with_capacity(capacity.min(1024)),
                order: VecDeque::with_capacity(capacity.min(1024)),
                capacity,
            })),
        }
    }

    /// Insert or refresh a session, evicting the LRU entry if at capacity.
    /// Returns the evicted session id if eviction occurred.
    pub async fn put(&self, session: ChatSession) -> Option<String> {
        let id = session.session_id.clone();
        let mut inner = self.inner.write().await;

        if inner.map.contains_key(&id) {
            inner.order.retain(|k| *k != id);
        }

        let evicted = if inner.map.len() >= inner.capacity && !inner.map.contains_key(&id) {
            if let Some(lru) = inner.order.pop_front() {
                inner.map.remove(&lru);
                Some(lru)
            } else {
                None
            }
        } else {
            None
        };

        inner.map.insert(id.clone(), session);
        inner.order.push_back(id);

        evicted
    }

    /// Retrieve a session, promoting it to most-recently-used.
    pub async fn get(&self, session_id: &str) -> Option<ChatSession> {
        let mut inner = self.inner.write().await;
        if let Some(session) = inner.map.get(session_id) {
            let session = session.clone();
            inner.order.retain(|k| k != session_id);
            inner.order.push_back(session_id.to_string());
            Some(session)
        } else {
            None
        }
    }

    /// Current number of cached sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.map.is_empty()
    }
}
