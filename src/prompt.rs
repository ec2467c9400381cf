//! System prompt construction
//!
//! The base prompt sets the companion's tone; when the memory subsystem has
//! prior context for the user, a memory section is appended so the model can
//! reference earlier conversations naturally.

use crate::memory::{RiskLevel, UserContext};

const BASE_PROMPT: &str = "\
You are a supportive AI companion for mental health conversations. You're like \
a caring friend who listens well and occasionally offers gentle perspectives.

CONVERSATION STYLE:
- Be warm, genuine, and conversational (like texting a good friend)
- Listen more than you advise - sometimes people just need to be heard
- Keep responses natural and brief (1-3 sentences usually)
- Don't always give advice - sometimes just acknowledge what they're sharing
- Use casual, empathetic language (\"That sounds really tough\")

WHEN TO RESPOND NATURALLY:
- For casual sharing: just listen and validate
- For venting: let them express without immediately solving
- Only offer suggestions when they seem to be seeking guidance

CRISIS SITUATIONS ONLY:
If someone mentions suicide, self-harm, or being in immediate danger, provide \
crisis resources (the 988 Suicide & Crisis Lifeline) and encourage professional \
help immediately.

BOUNDARIES:
- You're a supportive listener, not a therapist
- Don't diagnose or give medical advice
- If they need professional help, suggest it gently";

/// Fixed response when the model backend is unavailable.
pub const FALLBACK_RESPONSE: &str = "I apologize, but I'm experiencing technical \
difficulties right now. Please try again in a moment. If you're in crisis, \
please contact 988 immediately.";

/// Build the system prompt, appending a memory section when prior context
/// exists for this user.
pub fn build_system_prompt(context: &UserContext) -> String {
    if context.is_empty() {
        return BASE_PROMPT.to_string();
    }

    let mut prompt = String::from(BASE_PROMPT);
    prompt.push_str("\n\nMEMORY CONTEXT:\n");

    let name = context
        .profile
        .as_ref()
        .and_then(|p| p.name.as_deref())
        .unwrap_or("Not provided");
    prompt.push_str(&format!("- User's name: {}\n", name));

    if !context.key_topics.is_empty() {
        prompt.push_str(&format!(
            "- Previous concerns: {}\n",
            context.key_topics.join(", ")
        ));
    }
    if !context.mood_patterns.is_empty() {
        prompt.push_str(&format!(
            "- Mood patterns: {}\n",
            context.mood_patterns.join(", ")
        ));
    }
    if !context.previous_advice.is_empty() {
        prompt.push_str("- Advice already given:\n");
        for advice in &context.previous_advice {
            prompt.push_str(&format!("  - {}\n", advice));
        }
    }
    if !context.follow_ups.is_empty() {
        prompt.push_str("- Follow-ups needed:\n");
        for follow_up in &context.follow_ups {
            prompt.push_str(&format!("  - {}\n", follow_up));
        }
    }
    if context.peak_risk > RiskLevel::Low {
        prompt.push_str(&format!(
            "- Prior sessions showed {} risk indicators; stay attentive and \
surface crisis resources if anything resurfaces\n",
            match context.peak_risk {
                RiskLevel::High => "high",
                _ => "elevated",
            }
        ));
    }

    prompt.push_str(
        "\nCONTINUITY GUIDELINES:\n\
- Reference their name naturally when appropriate\n\
- Ask follow-up questions about topics they mentioned before\n\
- Remember advice you've given and check how it's going\n\
- Don't repeat the same advice unless they ask for clarification",
    );

    prompt
}
