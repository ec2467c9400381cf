//! Conversation engine — per-message orchestration
//!
//! Each inbound message runs the full turn: resolve identity, load or
//! create the profile and session, synthesize memory context, call the
//! model backend, extract insights, and persist. Every failure mode
//! degrades rather than aborts: storage problems produce a non-durable turn
//! and a model outage produces the fixed fallback response.
//!
//! Turns are serialized per user with a per-key mutex, since the HTTP
//! layer handles requests concurrently and the stores are whole-file
//! overwrites.

use crate::config::HearthConfig;
use crate::identity::IdentityResolver;
use crate::memory::{
    ChatSession, ContextSynthesizer, InsightExtractor, MemoryStore, MessageRole, SessionCache,
    UserProfile,
};
use crate::model::{CompletionBackend, PromptMessage, PromptRole};
use crate::prompt::{build_system_prompt, FALLBACK_RESPONSE};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of one conversational turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Assistant reply (or the fallback message)
    pub response: String,
    /// Session id the caller should echo on the next turn
    pub session_id: String,
}

/// Orchestrates the memory subsystem and the model backend per message.
pub struct ConversationEngine {
    store: MemoryStore,
    cache: SessionCache,
    synthesizer: ContextSynthesizer,
    extractor: InsightExtractor,
    resolver: IdentityResolver,
    backend: Arc<dyn CompletionBackend>,
    history_window: usize,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationEngine {
    /// Create an engine over a store and a model backend.
    pub fn new(store: MemoryStore, backend: Arc<dyn CompletionBackend>, config: &HearthConfig) -> Self {
        Self {
            store,
            cache: SessionCache::new(config.context.session_cache_capacity),
            synthesizer: ContextSynthesizer::new(&config.context),
            extractor: InsightExtractor::new(),
            resolver: IdentityResolver::new(),
            backend,
            history_window: config.context.history_window,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one user message.
    ///
    /// Never fails outright: a model outage yields the fallback response
    /// with the session id preserved, and a storage failure yields the
    /// model's response with the turn marked non-durable in the logs.
    pub async fn handle_message(&self, message: &str, session_id: Option<&str>) -> ChatTurn {
        let name = self.resolver.resolve(message);

        // An existing session is looked up before deciding identity so an
        // anonymous caller keeps the identity their session was minted with.
        let existing = match session_id {
            Some(sid) => self.find_session(sid).await,
            None => None,
        };

        let user_id = match (&name, &existing) {
            (Some(name), _) => self.resolver.user_id(name),
            (None, Some(session)) => session.user_id.clone(),
            (None, None) => self.resolver.anonymous_user_id(),
        };

        let lock = self.user_lock(&user_id).await;
        let _guard = lock.lock().await;

        let mut profile = self.load_or_create_profile(&user_id, name).await;

        let mut session = match existing {
            Some(session) => session,
            None => {
                let id = ChatSession::make_id(&user_id, Utc::now());
                tracing::info!(session_id = %id, user_id = %user_id, "Starting new session");
                ChatSession::new(id, &user_id)
            }
        };

        let context = self.synthesizer.synthesize(&self.store, &user_id).await;

        let mut messages = Vec::with_capacity(self.history_window + 2);
        messages.push(PromptMessage::new(
            PromptRole::System,
            build_system_prompt(&context),
        ));
        for record in session.recent_messages(self.history_window) {
            let role = match record.role {
                MessageRole::User => PromptRole::User,
                MessageRole::Assistant => PromptRole::Assistant,
            };
            messages.push(PromptMessage::new(role, record.content.clone()));
        }
        messages.push(PromptMessage::new(PromptRole::User, message));

        let reply = match self.backend.complete(&messages).await {
            Ok(reply) => reply,
            Err(e) => {
                // The turn is not persisted; the caller keeps their session
                // id and can simply try again.
                tracing::error!(session_id = %session.session_id, "Model backend failed: {}", e);
                return ChatTurn {
                    response: FALLBACK_RESPONSE.to_string(),
                    session_id: session.session_id,
                };
            }
        };

        session.push_message(MessageRole::User, message);
        session.push_message(MessageRole::Assistant, reply.clone());
        self.extractor.observe(&mut session, message, &reply);

        if !self.store.save_session(&session).await {
            tracing::warn!(session_id = %session.session_id, "Session not durable this turn");
        }
        if !self.store.save_profile(&mut profile).await {
            tracing::warn!(user_id = %profile.user_id, "Profile not durable this turn");
        }

        let session_id = session.session_id.clone();
        self.cache.put(session).await;

        ChatTurn {
            response: reply,
            session_id,
        }
    }

    /// Look up a session in the cache, then on disk via its id's owner
    /// prefix. Unknown or malformed ids mean a fresh session.
    async fn find_session(&self, session_id: &str) -> Option<ChatSession> {
        if let Some(session) = self.cache.get(session_id).await {
            return Some(session);
        }
        let owner = ChatSession::owner_of(session_id)?;
        self.store.load_session(owner, session_id).await
    }

    async fn load_or_create_profile(&self, user_id: &str, name: Option<String>) -> UserProfile {
        if let Some(mut profile) = self.store.load_profile(user_id).await {
            tracing::debug!(user_id = %user_id, "Loaded existing profile");
            // A named introduction can arrive for a profile first seen
            // before the name was shared on this identity.
            if profile.name.is_none() {
                profile.name = name;
            }
            return profile;
        }

        let mut profile = UserProfile::new(user_id, name);
        if self.store.save_profile(&mut profile).await {
            tracing::info!(
                user_id = %user_id,
                name = %profile.name.as_deref().unwrap_or("<anonymous>"),
                "Created new profile"
            );
        }
        profile
    }

    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
