use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use chatweave_types::UserId;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    telegram::{TgMessage, Update},
};

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram webhook
///
/// Answers 200 for every authenticated update, including ones that failed to
/// process, so the platform does not redeliver them.
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<StatusCode> {
    if let Some(secret) = &state.config.telegram_webhook_secret {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(secret.as_str()) {
            tracing::warn!("Rejected webhook call with a bad secret token");
            return Err(ApiError::Unauthorized);
        }
    }

    let update: Update = match serde_json::from_value(body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!("Ignoring malformed update: {}", e);
            return Ok(StatusCode::OK);
        }
    };

    if let Some(message) = update.message {
        handle_message(&state, &message).await;
    }
    Ok(StatusCode::OK)
}

async fn handle_message(state: &AppState, tg: &TgMessage) {
    let chat_id = tg.chat.id;

    let joined: Vec<UserId> = tg
        .new_chat_members
        .iter()
        .filter(|m| !m.is_bot)
        .map(|m| m.id)
        .collect();
    let left: Vec<UserId> = tg.left_chat_member.iter().map(|m| m.id).collect();
    if let Err(e) = state
        .orchestrator
        .handle_membership(chat_id, tg.chat.title.as_deref(), &joined, &left)
        .await
    {
        tracing::warn!(chat_id, "Failed to update chat membership: {}", e);
    }

    let Some(message) = tg.to_message() else {
        return;
    };
    match state.orchestrator.process_message(message).await {
        Ok(outcome) => tracing::debug!(
            chat_id,
            thread_id = %outcome.thread_id,
            replied = outcome.reply.is_some(),
            "Update processed"
        ),
        Err(e) => tracing::error!(chat_id, message_id = tg.message_id, "Failed to process message: {}", e),
    }
}
