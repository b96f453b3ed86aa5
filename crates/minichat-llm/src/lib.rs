//! Groq chat-completions client.
//!
//! Thin wrapper over the OpenAI-compatible Groq endpoint. Two modes: `mock`
//! (deterministic canned generation, no network, no key) and `live` (real API
//! call, requires `GROQ_API_KEY`). The API key is only ever logged masked.

use minichat_core::ChatMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ENV_API_KEY: &str = "GROQ_API_KEY";

/// Default request parameters, matching the original backend.
const DEFAULT_MODEL: &str = "llama3-70b-8192";
const DEFAULT_TEMPERATURE: f32 = 1.0;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TOP_P: f32 = 1.0;

/// Mode for LLM invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LlmMode {
    /// Deterministic simulated generation; used by default and in tests.
    #[default]
    Mock,
    /// Calls the Groq API; requires `GROQ_API_KEY`.
    Live,
}

impl LlmMode {
    /// Parses the config `llm_mode` string; anything but "live" is mock.
    pub fn from_config(mode: &str) -> Self {
        match mode {
            "live" => LlmMode::Live,
            _ => LlmMode::Mock,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{ENV_API_KEY} environment variable is not set")]
    MissingApiKey,
    #[error("request to Groq API failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Groq API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Groq API returned no completion choices")]
    EmptyCompletion,
}

/// Masks an API key for safe logging: first 7 chars + "***" + last 4 chars,
/// or just "***" when the key is too short to mask partially.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Chat client for the Groq API with a mock fallback mode.
#[derive(Debug)]
pub struct GroqClient {
    http: reqwest::Client,
    mode: LlmMode,
    api_key: Option<String>,
    model: String,
}

impl GroqClient {
    /// Builds a client for the given mode, reading `GROQ_API_KEY` from the
    /// environment. Live mode without a key is a startup error.
    pub fn from_env(mode: LlmMode) -> Result<Self, LlmError> {
        let api_key = std::env::var(ENV_API_KEY).ok().filter(|k| !k.is_empty());
        if mode == LlmMode::Live && api_key.is_none() {
            return Err(LlmError::MissingApiKey);
        }
        if let Some(key) = api_key.as_deref() {
            tracing::info!(
                target: "minichat::llm",
                api_key = %mask_token(key),
                mode = ?mode,
                "Groq client configured"
            );
        }
        Ok(Self {
            http: reqwest::Client::new(),
            mode,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Mock-mode client for tests and offline runs.
    pub fn mock() -> Self {
        Self {
            http: reqwest::Client::new(),
            mode: LlmMode::Mock,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    /// Sends the conversation and returns the assistant reply.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        match self.mode {
            LlmMode::Mock => Ok(mock_generate(messages)),
            LlmMode::Live => self.live_chat(messages).await,
        }
    }

    async fn live_chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            stream: false,
        };
        tracing::info!(
            target: "minichat::llm",
            model = %self.model,
            message_count = messages.len(),
            "Groq chat completion request"
        );

        let response = self
            .http
            .post(GROQ_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        if let Some(u) = &completion.usage {
            tracing::info!(
                target: "minichat::llm",
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "Groq chat completion usage"
            );
        }
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyCompletion)
    }
}

/// Deterministic simulated generation for mock mode: echoes a preview of the
/// last user message so callers and tests can correlate request and reply.
fn mock_generate(messages: &[ChatMessage]) -> String {
    let last_user = messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or("");
    let preview: String = last_user
        .chars()
        .take(80)
        .chain(if last_user.chars().count() > 80 {
            "…".chars()
        } else {
            "".chars()
        })
        .collect();
    format!(
        "[Generated – Mock LLM]\n\nBased on your message ({}), here is a simulated reply:\n\nThank you for reaching out. A live model would answer here.",
        preview
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_token_short_keys_are_fully_masked() {
        assert_eq!(mask_token(""), "***");
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("elevenchars"), "***");
    }

    #[test]
    fn mask_token_long_keys_keep_head_and_tail() {
        assert_eq!(mask_token("gsk_abcdefghijklmnop"), "gsk_abc***mnop");
    }

    #[test]
    fn mock_generation_is_deterministic_and_echoes_the_user_message() {
        let messages = vec![
            ChatMessage::new("system", "You are a helpful assistant."),
            ChatMessage::new("user", "what is rust"),
        ];
        let a = mock_generate(&messages);
        let b = mock_generate(&messages);
        assert_eq!(a, b);
        assert!(a.contains("what is rust"));
    }

    #[test]
    fn mock_generation_truncates_long_messages() {
        let long = "x".repeat(200);
        let messages = vec![ChatMessage::new("user", long)];
        let generated = mock_generate(&messages);
        assert!(generated.contains(&"x".repeat(80)));
        assert!(!generated.contains(&"x".repeat(81)));
        assert!(generated.contains('…'));
    }

    #[test]
    fn live_mode_from_env_without_key_is_an_error() {
        std::env::remove_var(ENV_API_KEY);
        let err = GroqClient::from_env(LlmMode::Live).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn request_body_matches_the_groq_wire_shape() {
        let messages = vec![ChatMessage::new("user", "hi")];
        let request = ChatCompletionRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3-70b-8192");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn completion_response_parses_choices_and_usage() {
        let raw = r#"{
            "choices": [ { "message": { "role": "assistant", "content": "Hello!" } } ],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hello!"));
        assert_eq!(parsed.usage.as_ref().map(|u| u.total_tokens), Some(15));
    }
}
