//! Context synthesis from recent sessions
//!
//! Folds a user's profile and their most recent sessions into a bounded,
//! deduplicated `UserContext` for prompt injection. Ordering is
//! deterministic: sessions are scanned newest first, entries within a
//! session in insertion order, and the first occurrence of a value wins.

use super::profile::UserProfile;
use super::session::RiskLevel;
use super::store::MemoryStore;
use crate::config::ContextConfig;

/// Bounded summary of what the companion remembers about a user.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    /// The user's profile, if one exists on disk
    pub profile: Option<UserProfile>,
    /// Distinct topics across recent sessions, newest first
    pub key_topics: Vec<String>,
    /// Distinct mood indicators across recent sessions
    pub mood_patterns: Vec<String>,
    /// Distinct advice snippets already given
    pub previous_advice: Vec<String>,
    /// Distinct follow-up notes
    pub follow_ups: Vec<String>,
    /// Highest risk level across the scanned sessions
    pub peak_risk: RiskLevel,
}

impl UserContext {
    /// Whether there is any remembered material worth injecting.
    pub fn is_empty(&self) -> bool {
        self.profile.is_none()
            && self.key_topics.is_empty()
            && self.mood_patterns.is_empty()
            && self.previous_advice.is_empty()
            && self.follow_ups.is_empty()
    }
}

/// Synthesizes `UserContext` values from the store.
pub struct ContextSynthesizer {
    recent_sessions: usize,
    max_topics: usize,
    max_moods: usize,
    max_advice: usize,
    max_follow_ups: usize,
}

impl ContextSynthesizer {
    /// Create a synthesizer with caps from the context configuration.
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            recent_sessions: config.recent_sessions,
            max_topics: config.max_topics,
            max_moods: config.max_moods,
            max_advice: config.max_advice,
            max_follow_ups: config.max_follow_ups,
        }
    }

    /// Build the context for a user from their profile and recent sessions.
    pub async fn synthesize(&self, store: &MemoryStore, user_id: &str) -> UserContext {
        let profile = store.load_profile(user_id).await;
        let sessions = store.recent_sessions(user_id, self.recent_sessions).await;

        let mut context = UserContext {
            profile,
            ..Default::default()
        };

        for session in &sessions {
            merge_capped(&mut context.key_topics, &session.topics_discussed, self.max_topics);
            merge_capped(&mut context.mood_patterns, &session.mood_indicators, self.max_moods);
            merge_capped(&mut context.previous_advice, &session.advice_given, self.max_advice);
            merge_capped(&mut context.follow_ups, &session.follow_ups_needed, self.max_follow_ups);
            if session.risk_level > context.peak_risk {
                context.peak_risk = session.risk_level;
            }
        }

        tracing::debug!(
            user_id = %user_id,
            sessions = sessions.len(),
            topics = context.key_topics.len(),
            moods = context.mood_patterns.len(),
            "Synthesized user context"
        );

        context
    }
}

/// Append distinct values into `target` until it reaches `cap`.
fn merge_capped(target: &mut Vec<String>, source: &[String], cap: usize) {
    for value in source {
        if target.len() >= cap {
            return;
        }
        if !target.iter().any(|v| v == value) {
            target.push(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::session::ChatSession;
    use tempfile::TempDir;

    fn config() -> ContextConfig {
        ContextConfig::default()
    }

    async fn store() -> (MemoryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new(dir.path()).await.unwrap();
        (store, dir)
    }

    async fn save_session_with(
        store: &MemoryStore,
        id: &str,
        topics: &[&str],
        advice: &[&str],
        risk: RiskLevel,
    ) {
        let mut session = ChatSession::new(id, "abc123def456");
        for t in topics {
            session.note_topic(t);
        }
        for a in advice {
            session.note_advice(a);
        }
        session.escalate_risk(risk);
        assert!(store.save_session(&session).await);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_empty_context_for_unknown_user() {
        let (store, _dir) = store().await;
        let synthesizer = ContextSynthesizer::new(&config());
        let context = synthesizer.synthesize(&store, "000000000000").await;
        assert!(context.is_empty());
        assert_eq!(context.peak_risk, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_caps_respected() {
        let (store, _dir) = store().await;

        // Three sessions with more material than the caps allow
        save_session_with(
            &store,
            "abc123def456_20260801_120000",
            &["sleep", "anxiety", "work"],
            &["advice one", "advice two"],
            RiskLevel::Low,
        )
        .await;
        save_session_with(
            &store,
            "abc123def456_20260802_120000",
            &["health", "relationships", "depression"],
            &["advice three", "advice four"],
            RiskLevel::Low,
        )
        .await;
        save_session_with(
            &store,
            "abc123def456_20260803_120000",
            &["sleep", "work", "anxiety"],
            &["advice five"],
            RiskLevel::Low,
        )
        .await;

        let synthesizer = ContextSynthesizer::new(&config());
        let context = synthesizer.synthesize(&store, "abc123def456").await;

        assert!(context.key_topics.len() <= 5);
        assert!(context.mood_patterns.len() <= 5);
        assert!(context.previous_advice.len() <= 3);
        assert!(context.follow_ups.len() <= 3);
    }

    #[tokio::test]
    async fn test_deterministic_newest_first_order() {
        let (store, _dir) = store().await;

        save_session_with(
            &store,
            "abc123def456_20260801_120000",
            &["health", "work"],
            &[],
            RiskLevel::Low,
        )
        .await;
        save_session_with(
            &store,
            "abc123def456_20260802_120000",
            &["sleep", "anxiety"],
            &[],
            RiskLevel::Low,
        )
        .await;

        let synthesizer = ContextSynthesizer::new(&config());
        let context = synthesizer.synthesize(&store, "abc123def456").await;

        // Newest session's topics come first, insertion order preserved
        assert_eq!(context.key_topics, vec!["sleep", "anxiety", "health", "work"]);
    }

    #[tokio::test]
    async fn test_deduplication_across_sessions() {
        let (store, _dir) = store().await;

        save_session_with(
            &store,
            "abc123def456_20260801_120000",
            &["sleep"],
            &["drink less coffee"],
            RiskLevel::Low,
        )
        .await;
        save_session_with(
            &store,
            "abc123def456_20260802_120000",
            &["sleep"],
            &["drink less coffee"],
            RiskLevel::Low,
        )
        .await;

        let synthesizer = ContextSynthesizer::new(&config());
        let context = synthesizer.synthesize(&store, "abc123def456").await;

        assert_eq!(context.key_topics, vec!["sleep"]);
        assert_eq!(context.previous_advice, vec!["drink less coffee"]);
    }

    #[tokio::test]
    async fn test_window_limits_sessions_scanned() {
        let (store, _dir) = store().await;

        // Oldest session carries a unique topic that should fall outside
        // the 3-session window.
        save_session_with(
            &store,
            "abc123def456_20260801_120000",
            &["relationships"],
            &[],
            RiskLevel::Low,
        )
        .await;
        for (i, topic) in ["sleep", "work", "health"].iter().enumerate() {
            save_session_with(
                &store,
                &format!("abc123def456_2026080{}_120000", i + 2),
                &[topic],
                &[],
                RiskLevel::Low,
            )
            .await;
        }

        let synthesizer = ContextSynthesizer::new(&config());
        let context = synthesizer.synthesize(&store, "abc123def456").await;

        assert!(!context.key_topics.contains(&"relationships".to_string()));
        assert_eq!(context.key_topics.len(), 3);
    }

    #[tokio::test]
    async fn test_peak_risk_across_window() {
        let (store, _dir) = store().await;

        save_session_with(
            &store,
            "abc123def456_20260801_120000",
            &[],
            &[],
            RiskLevel::Elevated,
        )
        .await;
        save_session_with(
            &store,
            "abc123def456_20260802_120000",
            &[],
            &[],
            RiskLevel::Low,
        )
        .await;

        let synthesizer = ContextSynthesizer::new(&config());
        let context = synthesizer.synthesize(&store, "abc123def456").await;
        assert_eq!(context.peak_risk, RiskLevel::Elevated);
    }
}
