//! File-backed profile and session persistence
//!
//! One JSON document per profile under `{data_dir}/profiles/`, one per
//! session under `{data_dir}/sessions/{user_id}/`. Writes are whole-file
//! overwrites. Loads degrade to `None` on any I/O or parse failure, and
//! saves report failure as `false`; neither ever propagates an error to the
//! caller, so a broken disk degrades the conversation instead of ending it.

use super::profile::UserProfile;
use super::session::ChatSession;
use std::path::{Path, PathBuf};

/// File-backed store for profiles and sessions.
pub struct MemoryStore {
    profiles_dir: PathBuf,
    sessions_dir: PathBuf,
}

impl MemoryStore {
    /// Create a store rooted at `data_dir`, creating its subdirectories.
    pub async fn new(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let data_dir = data_dir.as_ref();
        let profiles_dir = data_dir.join("profiles");
        let sessions_dir = data_dir.join("sessions");

        tokio::fs::create_dir_all(&profiles_dir).await?;
        tokio::fs::create_dir_all(&sessions_dir).await?;

        tracing::info!(data_dir = %data_dir.display(), "Memory store initialized");

        Ok(Self {
            profiles_dir,
            sessions_dir,
        })
    }

    /// Load a profile, or `None` if absent or unreadable.
    pub async fn load_profile(&self, user_id: &str) -> Option<UserProfile> {
        let path = self.profiles_dir.join(format!("{}.json", user_id));
        read_json(&path).await
    }

    /// Save a profile, refreshing its `last_active` timestamp first.
    ///
    /// Returns `false` on failure; the caller keeps the turn alive and
    /// treats the state as not durable.
    pub async fn save_profile(&self, profile: &mut UserProfile) -> bool {
        profile.touch();
        let path = self.profiles_dir.join(format!("{}.json", profile.user_id));
        write_json(&path, profile).await
    }

    /// Load one session by id, or `None` if absent or unreadable.
    pub async fn load_session(&self, user_id: &str, session_id: &str) -> Option<ChatSession> {
        let path = self
            .sessions_dir
            .join(user_id)
            .join(format!("{}.json", session_id));
        read_json(&path).await
    }

    /// Save a session under its owner's directory.
    ///
    /// Returns `false` on failure, logging the cause.
    pub async fn save_session(&self, session: &ChatSession) -> bool {
        let user_dir = self.sessions_dir.join(&session.user_id);
        if let Err(e) = tokio::fs::create_dir_all(&user_dir).await {
            tracing::warn!(
                session_id = %session.session_id,
                "Failed to create session directory: {}",
                e
            );
            return false;
        }
        let path = user_dir.join(format!("{}.json", session.session_id));
        write_json(&path, session).await
    }

    /// Up to `limit` of a user's sessions, newest first by file
    /// modification time. Unreadable files are skipped.
    pub async fn recent_sessions(&self, user_id: &str, limit: usize) -> Vec<ChatSession> {
        let user_dir = self.sessions_dir.join(user_id);

        let mut entries = match tokio::fs::read_dir(&user_dir).await {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut candidates: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let mtime = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(mtime) => mtime,
                Err(_) => continue,
            };
            candidates.push((mtime, path));
        }

        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        candidates.truncate(limit);

        let mut sessions = Vec::with_capacity(candidates.len());
        for (_, path) in candidates {
            if let Some(session) = read_json::<ChatSession>(&path).await {
                sessions.push(session);
            }
        }
        sessions
    }
}

/// Read and parse a JSON file, degrading to `None` with a log line.
async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read: {}", e);
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to parse: {}", e);
            None
        }
    }
}

/// Serialize and write a JSON file, reporting success.
async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> bool {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to serialize: {}", e);
            return false;
        }
    };
    match tokio::fs::write(path, json).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to write: {}", e);
            false
        }
    }
}
