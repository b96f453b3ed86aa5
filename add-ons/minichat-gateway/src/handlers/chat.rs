//! Chat handler: one endpoint, two answer paths.
//!
//! `mode: "minigpt"` routes the message to the offline tree responder, which
//! always answers and never errors. Any other mode is the Groq path: the
//! message joins its conversation history and the full history goes to the
//! LLM client. Conversation history lives in memory for the process lifetime.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use minichat_core::{ChatMessage, ConversationStore};
use serde::Deserialize;

use crate::AppState;

const OFFLINE_MODE: &str = "minigpt";

#[derive(Deserialize)]
pub(crate) struct ChatRequest {
    pub message: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_role() -> String {
    "user".to_string()
}

fn default_mode() -> String {
    "groq".to_string()
}

type ChatError = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, detail: String) -> ChatError {
    (status, Json(serde_json::json!({ "detail": detail })))
}

/// POST /chat – answer a message via the offline responder or the LLM.
pub(crate) async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, ChatError> {
    if req.mode == OFFLINE_MODE {
        let response = state.responder.get_response(&req.message);
        tracing::info!(
            target: "minichat::chat",
            mode = OFFLINE_MODE,
            message_len = req.message.len(),
            "chat answered offline"
        );
        return Ok(Json(serde_json::json!({
            "response": response,
            "conversation_id": req.conversation_id
        })));
    }

    let id = ConversationStore::resolve_id(req.conversation_id.as_deref()).to_string();
    if !state.conversations.get_or_create(&id) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Conversation is inactive. Please start a new conversation.".to_string(),
        ));
    }

    state
        .conversations
        .push_message(&id, ChatMessage::new(req.role.clone(), req.message.clone()));
    let history = state.conversations.messages(&id);

    match state.llm.chat(&history).await {
        Ok(reply) => {
            state
                .conversations
                .push_message(&id, ChatMessage::new("assistant", reply.clone()));
            tracing::info!(
                target: "minichat::chat",
                conversation_id = %id,
                history_len = history.len(),
                "chat answered via LLM"
            );
            Ok(Json(serde_json::json!({
                "response": reply,
                "conversation_id": req.conversation_id
            })))
        }
        Err(e) => {
            tracing::error!(target: "minichat::chat", error = %e, "LLM request failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error querying Groq API: {}", e),
            ))
        }
    }
}
