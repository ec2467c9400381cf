//! Hearth - Supportive AI Companion Backend with Persistent Conversational Memory
//!
//! Hearth forwards chat messages to an OpenAI-compatible model API and
//! remembers who it talked to: per-user profiles and session histories live
//! as JSON files on disk, and every model call is primed with a bounded
//! summary of what previous conversations covered.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      HTTP API (axum)                      │
//! │              POST /chat   GET /health   GET /             │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │
//! ┌────────────────────────────▼─────────────────────────────┐
//! │                   Conversation Engine                     │
//! │   resolve identity → load profile/session → synthesize    │
//! │   context → model call → extract insights → persist       │
//! └──────┬──────────────────────┬──────────────────────┬─────┘
//!        │                      │                      │
//! ┌──────▼───────┐   ┌──────────▼──────────┐   ┌───────▼──────┐
//! │   Identity   │   │   Memory Subsystem   │   │    Model     │
//! │   Resolver   │   │  store · cache ·     │   │   Backend    │
//! │              │   │  extractor ·         │   │  (reqwest)   │
//! │              │   │  synthesizer         │   │              │
//! └──────────────┘   └──────────────────────┘   └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`]: HTTP routes and the inbound chat contract
//! - [`engine`]: per-message orchestration
//! - [`identity`]: stable user ids from free-text introductions
//! - [`memory`]: profiles, sessions, persistence, context synthesis
//! - [`model`]: completion backend seam and HTTP client
//! - [`prompt`]: system prompt construction
//! - [`config`]: configuration management

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod memory;
pub mod model;
pub mod prompt;

pub use config::HearthConfig;
pub use error::{Error, Result};
