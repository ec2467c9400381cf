//! Rule-based insight extraction from message pairs
//!
//! After each completed user/assistant exchange the extractor classifies the
//! user message against topic and mood vocabularies, scans the reply for
//! advice markers, and checks for follow-up intent and crisis language.
//! Extraction is deterministic (no LLM): case-insensitive substring match,
//! first occurrence wins, each category recorded at most once per session.
//!
//! The vocabularies are plain data, so they can be replaced without
//! touching the extraction control flow.

use super::session::{ChatSession, RiskLevel};
use serde::{Deserialize, Serialize};

/// Note appended when a user signals they want to continue later.
pub const FOLLOW_UP_NOTE: &str = "User expressed interest in continuing conversation";

/// A keyword table mapping category tags to trigger substrings.
///
/// Categories are kept in declaration order so matching is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LexiconEntry {
    category: String,
    triggers: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon from `(category, triggers)` pairs.
    pub fn from_entries(entries: &[(&str, &[&str])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(category, triggers)| LexiconEntry {
                    category: category.to_string(),
                    triggers: triggers.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Categories whose triggers appear in the lowercased text.
    pub fn matches<'a>(&'a self, lowered: &str) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter(|e| e.triggers.iter().any(|t| lowered.contains(t.as_str())))
            .map(|e| e.category.as_str())
            .collect()
    }
}

/// Topic vocabulary from the companion's support domains.
pub fn default_topic_lexicon() -> Lexicon {
    Lexicon::from_entries(&[
        ("sleep", &["sleep", "insomnia", "tired", "sleepy", "awake", "rest"][..]),
        ("anxiety", &["anxious", "anxiety", "worried", "panic", "stress"][..]),
        ("depression", &["sad", "depressed", "hopeless", "down", "empty"][..]),
        ("work", &["work", "job", "boss", "colleague", "office", "career"][..]),
        (
            "relationships",
            &["friend", "family", "partner", "relationship", "social"][..],
        ),
        ("health", &["health", "medication", "doctor", "physical", "body"][..]),
    ])
}

/// Mood vocabulary.
pub fn default_mood_lexicon() -> Lexicon {
    Lexicon::from_entries(&[
        ("positive", &["good", "happy", "better", "great", "fine", "okay"][..]),
        ("negative", &["bad", "terrible", "awful", "horrible", "worse"][..]),
        ("anxious", &["anxious", "worried", "nervous", "stressed"][..]),
        ("sad", &["sad", "down", "depressed", "hopeless", "empty"][..]),
        ("tired", &["tired", "exhausted", "sleepy", "fatigue"][..]),
    ])
}

/// Crisis vocabulary driving risk escalation.
///
/// High outranks Elevated; the session keeps the highest level ever seen.
pub fn default_crisis_lexicon() -> Vec<(RiskLevel, Vec<String>)> {
    let high = [
        "suicide",
        "suicidal",
        "kill myself",
        "end my life",
        "self-harm",
        "hurt myself",
        "no reason to live",
    ];
    let elevated = ["hopeless", "can't go on", "panic attack", "give up"];
    vec![
        (RiskLevel::High, high.iter().map(|s| s.to_string()).collect()),
        (
            RiskLevel::Elevated,
            elevated.iter().map(|s| s.to_string()).collect(),
        ),
    ]
}

/// Phrases in an assistant reply that mark it as advice.
fn default_advice_markers() -> Vec<String> {
    [
        "try", "consider", "might help", "suggestion", "recommend", "could", "maybe",
        "perhaps", "what if", "how about",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Phrases in a user message that signal follow-up intent.
fn default_follow_up_markers() -> Vec<String> {
    ["follow up", "next time", "again", "continue"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Extracts topics, moods, advice, follow-ups, and risk from exchanges.
pub struct InsightExtractor {
    topics: Lexicon,
    moods: Lexicon,
    crisis: Vec<(RiskLevel, Vec<String>)>,
    advice_markers: Vec<String>,
    follow_up_markers: Vec<String>,
}

impl InsightExtractor {
    /// Create an extractor with the default vocabularies.
    pub fn new() -> Self {
        Self {
            topics: default_topic_lexicon(),
            moods: default_mood_lexicon(),
            crisis: default_crisis_lexicon(),
            advice_markers: default_advice_markers(),
            follow_up_markers: default_follow_up_markers(),
        }
    }

    /// Create an extractor with custom topic and mood tables.
    pub fn with_lexicons(topics: Lexicon, moods: Lexicon) -> Self {
        Self {
            topics,
            moods,
            ..Self::new()
        }
    }

    /// Classify a completed exchange and fold the findings into the session.
    ///
    /// Idempotent: feeding the same pair twice adds nothing the second time.
    pub fn observe(&self, session: &mut ChatSession, user_message: &str, reply: &str) {
        let user_lower = user_message.to_lowercase();

        for topic in self.topics.matches(&user_lower) {
            session.note_topic(topic);
        }
        for mood in self.moods.matches(&user_lower) {
            session.note_mood(mood);
        }

        for (level, triggers) in &self.crisis {
            if triggers.iter().any(|t| user_lower.contains(t.as_str())) {
                session.escalate_risk(*level);
                break;
            }
        }

        let reply_lower = reply.to_lowercase();
        if self
            .advice_markers
            .iter()
            .any(|m| reply_lower.contains(m.as_str()))
        {
            session.note_advice(reply);
        }

        if self
            .follow_up_markers
            .iter()
            .any(|m| user_lower.contains(m.as_str()))
        {
            session.note_follow_up(FOLLOW_UP_NOTE);
        }
    }
}

impl Default for InsightExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ChatSession {
        ChatSession::new("abc123def456_20260805_120000", "abc123def456")
    }

    #[test]
    fn test_topic_extraction() {
        let extractor = InsightExtractor::new();
        let mut s = session();
        extractor.observe(&mut s, "I can't sleep and work is stressing me out", "I hear you.");
        assert!(s.topics_discussed.contains(&"sleep".to_string()));
        assert!(s.topics_discussed.contains(&"work".to_string()));
        assert!(s.topics_discussed.contains(&"anxiety".to_string())); // "stress"
    }

    #[test]
    fn test_mood_extraction() {
        let extractor = InsightExtractor::new();
        let mut s = session();
        extractor.observe(&mut s, "I'm exhausted and feeling pretty down", "That sounds hard.");
        assert!(s.mood_indicators.contains(&"tired".to_string()));
        assert!(s.mood_indicators.contains(&"sad".to_string()));
    }

    #[test]
    fn test_advice_detection() {
        let extractor = InsightExtractor::new();
        let mut s = session();
        extractor.observe(
            &mut s,
            "any ideas?",
            "You could try a short walk before bed.",
        );
        assert_eq!(s.advice_given, vec!["You could try a short walk before bed."]);
    }

    #[test]
    fn test_no_advice_marker_records_nothing() {
        let extractor = InsightExtractor::new();
        let mut s = session();
        extractor.observe(&mut s, "thanks", "That sounds really tough.");
        assert!(s.advice_given.is_empty());
    }

    #[test]
    fn test_follow_up_detection() {
        let extractor = InsightExtractor::new();
        let mut s = session();
        extractor.observe(&mut s, "let's continue next time", "Of course.");
        assert_eq!(s.follow_ups_needed, vec![FOLLOW_UP_NOTE]);
    }

    #[test]
    fn test_observe_is_idempotent() {
        let extractor = InsightExtractor::new();
        let mut s = session();
        let user = "I can't sleep, let's talk again next time";
        let reply = "Maybe keep a wind-down routine before bed.";

        extractor.observe(&mut s, user, reply);
        let topics = s.topics_discussed.clone();
        let moods = s.mood_indicators.clone();
        let advice = s.advice_given.clone();
        let follow_ups = s.follow_ups_needed.clone();

        extractor.observe(&mut s, user, reply);
        assert_eq!(s.topics_discussed, topics);
        assert_eq!(s.mood_indicators, moods);
        assert_eq!(s.advice_given, advice);
        assert_eq!(s.follow_ups_needed, follow_ups);
    }

    #[test]
    fn test_crisis_language_escalates_risk() {
        let extractor = InsightExtractor::new();
        let mut s = session();

        extractor.observe(&mut s, "everything feels hopeless", "I'm here with you.");
        assert_eq!(s.risk_level, RiskLevel::Elevated);

        extractor.observe(&mut s, "I've been thinking about suicide", "Please reach out to 988.");
        assert_eq!(s.risk_level, RiskLevel::High);

        // Calmer message later never de-escalates
        extractor.observe(&mut s, "I feel okay today", "Glad to hear it.");
        assert_eq!(s.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_custom_lexicon_swaps_cleanly() {
        let topics = Lexicon::from_entries(&[("gardening", &["tomato", "compost"][..])]);
        let moods = Lexicon::from_entries(&[("curious", &["wonder"][..])]);
        let extractor = InsightExtractor::with_lexicons(topics, moods);

        let mut s = session();
        extractor.observe(&mut s, "I wonder if my tomato plants are okay", "Perhaps water them.");
        assert_eq!(s.topics_discussed, vec!["gardening"]);
        assert_eq!(s.mood_indicators, vec!["curious"]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let extractor = InsightExtractor::new();
        let mut s = session();
        extractor.observe(&mut s, "I CAN'T SLEEP", "TRY a nap.");
        assert!(s.topics_discussed.contains(&"sleep".to_string()));
        assert_eq!(s.advice_given.len(), 1);
    }
}
