//! Memory subsystem — persistent conversational context
//!
//! Profiles and sessions persist as one JSON file per entity; the
//! synthesizer folds recent sessions into a bounded context summary and the
//! extractor keeps sessions tagged as conversations progress.

pub mod cache;
pub mod extractor;
pub mod profile;
pub mod session;
pub mod store;
pub mod synthesizer;

pub use cache::SessionCache;
pub use extractor::InsightExtractor;
pub use profile::UserProfile;
pub use session::{ChatSession, MessageRecord, MessageRole, RiskLevel};
pub use store::MemoryStore;
pub use synthesizer::{ContextSynthesizer, UserContext};
