//! Persistent user profile record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user's persistent profile.
///
/// Created on first encounter of an identity, mutated on every chat turn
/// (at minimum the `last_active` bump on save), never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable identifier (12 hex chars, see [`crate::identity`])
    pub user_id: String,
    /// Display name; `None` for anonymous callers
    pub name: Option<String>,
    /// Age, if the user has shared it
    pub age: Option<u32>,
    /// Free-text concerns accumulated over time
    pub concerns: Vec<String>,
    /// Arbitrary preference key/value pairs
    pub preferences: HashMap<String, serde_json::Value>,
    /// Emergency contact, if the user has shared one
    pub emergency_contact: Option<String>,
    /// Creation timestamp; immutable after first save
    pub created_at: DateTime<Utc>,
    /// Refreshed on every save
    pub last_active: DateTime<Utc>,
}

impl UserProfile {
    /// Create a fresh profile for a user id.
    pub fn new(user_id: impl Into<String>, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            name,
            age: None,
            concerns: Vec::new(),
            preferences: HashMap::new(),
            emergency_contact: None,
            created_at: now,
            last_active: now,
        }
    }

    /// Refresh the last-active timestamp.
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}
