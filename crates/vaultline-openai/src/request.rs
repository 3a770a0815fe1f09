use vaultline_core::models::message::Message;

/// System instruction sent with every chat conversation.
pub const CHAT_SYSTEM_PROMPT: &str =
    "You are a helpful Web3 and DeFi assistant. Keep responses concise and helpful.";
pub const CHAT_MAX_TOKENS: u32 = 500;
pub const CHAT_TEMPERATURE: f32 = 0.7;

/// Fixed prompt used by the diagnostic probe.
pub const PROBE_PROMPT: &str = "Say 'Hello, API key is working!'";
pub const PROBE_MAX_TOKENS: u32 = 20;

/// One generation call, independent of the provider's wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// The interactive chat request. `messages` are forwarded unmodified.
    pub fn chat(messages: Vec<Message>) -> Self {
        Self {
            system: Some(CHAT_SYSTEM_PROMPT.to_string()),
            messages,
            max_tokens: CHAT_MAX_TOKENS,
            temperature: Some(CHAT_TEMPERATURE),
        }
    }

    /// The short, fixed diagnostic request.
    pub fn probe() -> Self {
        Self {
            system: None,
            messages: vec![Message::user(PROBE_PROMPT)],
            max_tokens: PROBE_MAX_TOKENS,
            temperature: None,
        }
    }
}
