//! Chat session record and its append/dedup operations
//!
//! A session is the unit of conversational memory: the raw message log plus
//! the tags the insight extractor has pulled out of it. Sessions are
//! append-only; there is no terminal state and no close operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Advice snippets longer than this are truncated with an ellipsis.
pub const ADVICE_SNIPPET_LEN: usize = 100;

/// Role of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Inbound user message
    User,
    /// Model reply
    Assistant,
}

/// A single message in a session's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Who said it
    pub role: MessageRole,
    /// What was said
    pub content: String,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

/// Session risk level, escalated by the insight extractor when crisis
/// language appears in user messages. Never de-escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No crisis indicators observed
    Low,
    /// Hopelessness or panic language observed
    Elevated,
    /// Explicit self-harm language observed
    High,
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

/// A persisted chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// `{user_id}_{YYYYmmdd_HHMMSS}`; sortable, owner recoverable by prefix
    pub session_id: String,
    /// Owning user
    pub user_id: String,
    /// Chronological message log, append-only
    pub messages: Vec<MessageRecord>,
    /// Distinct topic tags, insertion order
    pub topics_discussed: Vec<String>,
    /// Distinct mood tags, insertion order
    pub mood_indicators: Vec<String>,
    /// Distinct advice snippets, each at most ~100 chars
    pub advice_given: Vec<String>,
    /// Distinct follow-up notes
    pub follow_ups_needed: Vec<String>,
    /// Highest risk level observed so far
    #[serde(default)]
    pub risk_level: RiskLevel,
    /// Free-text summary; reserved in the persisted format
    pub summary: Option<String>,
    /// Creation timestamp
    pub started_at: DateTime<Utc>,
    /// Sessions are never explicitly closed; stays `None`
    pub ended_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    /// Create an empty session for a user.
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            messages: Vec::new(),
            topics_discussed: Vec::new(),
            mood_indicators: Vec::new(),
            advice_given: Vec::new(),
            follow_ups_needed: Vec::new(),
            risk_level: RiskLevel::Low,
            summary: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Build a session id from its parts.
    ///
    /// The timestamp component makes ids sortable and unique per creation
    /// moment; the user-id prefix makes the owner recoverable from a bare
    /// session id.
    pub fn make_id(user_id: &str, at: DateTime<Utc>) -> String {
        format!("{}_{}", user_id, at.format("%Y%m%d_%H%M%S"))
    }

    /// Recover the owning user id from a session id, if well-formed.
    pub fn owner_of(session_id: &str) -> Option<&str> {
        let (user_id, rest) = session_id.split_once('_')?;
        if user_id.len() == crate::identity::USER_ID_LEN
            && user_id.chars().all(|c| c.is_ascii_hexdigit())
            && !rest.is_empty()
        {
            Some(user_id)
        } else {
            None
        }
    }

    /// Append a message to the log.
    pub fn push_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(MessageRecord {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    /// The last `window` messages, oldest first.
    pub fn recent_messages(&self, window: usize) -> &[MessageRecord] {
        let start = self.messages.len().saturating_sub(window);
        &self.messages[start..]
    }

    /// Record a topic tag unless already present.
    pub fn note_topic(&mut self, topic: &str) {
        push_distinct(&mut self.topics_discussed, topic);
    }

    /// Record a mood tag unless already present.
    pub fn note_mood(&mut self, mood: &str) {
        push_distinct(&mut self.mood_indicators, mood);
    }

    /// Record an advice snippet, truncating to [`ADVICE_SNIPPET_LEN`]
    /// characters with an ellipsis, unless an identical snippet exists.
    pub fn note_advice(&mut self, reply: &str) {
        let snippet = if reply.chars().count() > ADVICE_SNIPPET_LEN {
            let truncated: String = reply.chars().take(ADVICE_SNIPPET_LEN).collect();
            format!("{}...", truncated)
        } else {
            reply.to_string()
        };
        push_distinct(&mut self.advice_given, &snippet);
    }

    /// Record a follow-up note unless already present.
    pub fn note_follow_up(&mut self, note: &str) {
        push_distinct(&mut self.follow_ups_needed, note);
    }

    /// Escalate the risk level. Lower levels are ignored.
    pub fn escalate_risk(&mut self, level: RiskLevel) {
        if level > self.risk_level {
            self.risk_level = level;
        }
    }
}

fn push_distinct(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}
