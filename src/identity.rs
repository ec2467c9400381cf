//! Identity resolution from free-text introductions
//!
//! Users identify themselves in-band ("my name is Raj"). The resolver scans
//! for a fixed, ordered list of introduction phrases and derives a stable
//! user id from the first acceptable name it finds. Callers who never
//! introduce themselves get a session-scoped anonymous identity instead of
//! sharing a default bucket.

use sha2::{Digest, Sha256};

/// Introduction phrases, scanned in priority order. The first phrase found
/// anywhere in the utterance wins, regardless of its position.
const INTRO_PHRASES: &[&str] = &["my name is ", "i am ", "call me ", "this is ", "i'm "];

/// Length of generated user ids, in hex characters.
pub const USER_ID_LEN: usize = 12;

/// Resolves user identities from chat utterances.
pub struct IdentityResolver {
    phrases: Vec<String>,
}

impl IdentityResolver {
    /// Create a resolver with the default phrase list.
    pub fn new() -> Self {
        Self {
            phrases: INTRO_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Scan an utterance for an introduction and return the cleaned name.
    ///
    /// The candidate is the first whitespace token after the matched phrase,
    /// with trailing punctuation stripped and the first letter upper-cased.
    /// Candidates shorter than 2 characters or containing non-alphabetic
    /// characters are rejected. Returns `None` when no acceptable name is
    /// present.
    pub fn resolve(&self, utterance: &str) -> Option<String> {
        let lower = utterance.to_lowercase();

        for phrase in &self.phrases {
            let Some(idx) = lower.find(phrase.as_str()) else {
                continue;
            };
            // Slice the lowercased text: lowercasing can change byte offsets
            // relative to the original, and the candidate is re-cased anyway.
            let rest = &lower[idx + phrase.len()..];
            let Some(token) = rest.split_whitespace().next() else {
                continue;
            };
            let cleaned = token.trim_end_matches(['.', ',', '!', '?']);
            if cleaned.len() >= 2 && cleaned.chars().all(|c| c.is_alphabetic()) {
                return Some(title_case(cleaned));
            }
            // Phrase matched but the candidate was unusable; scanning stops
            // at the highest-priority phrase, matching first-match-wins.
            return None;
        }

        None
    }

    /// Derive the stable user id for a name.
    ///
    /// Pure function of the lowercased name: the SHA-256 digest truncated to
    /// [`USER_ID_LEN`] hex characters. The same name always maps to the same
    /// id across processes and restarts.
    pub fn user_id(&self, name: &str) -> String {
        let digest = Sha256::digest(name.to_lowercase().as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        hex[..USER_ID_LEN].to_string()
    }

    /// Mint a fresh anonymous user id.
    ///
    /// Each unidentified caller gets their own identity, scoped to the
    /// session that minted it. Shaped like a named id (12 hex chars) so the
    /// rest of the system never distinguishes the two.
    pub fn anonymous_user_id(&self) -> String {
        let digest = Sha256::digest(uuid::Uuid::new_v4().as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        hex[..USER_ID_LEN].to_string()
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper-case the first character, lower-case the rest.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
