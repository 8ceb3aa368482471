use axum::{
    extract::{Path, State},
    Json,
};
use chatweave_engine::QuestionPrompt;
use chatweave_types::{ChatId, QueueEntry, QueueStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Deserialize)]
pub struct QuestionRoundRequest {
    /// Tell the chat when nobody is waiting instead of staying silent
    #[serde(default)]
    pub announce_empty: bool,
}

#[derive(Debug, Serialize)]
pub struct QuestionRoundResponse {
    pub asked: Option<QuestionPrompt>,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub chat_id: ChatId,
    pub waiting: usize,
    pub entries: Vec<QueueEntry>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// Ask the next waiting member a question
pub async fn run_question_round(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<ChatId>,
    req: Option<Json<QuestionRoundRequest>>,
) -> ApiResult<Json<QuestionRoundResponse>> {
    let announce_empty = req.is_some_and(|Json(r)| r.announce_empty);
    let asked = state
        .orchestrator
        .run_question_round(chat_id, announce_empty)
        .await?;

    Ok(Json(QuestionRoundResponse { asked }))
}

pub async fn get_queue(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<ChatId>,
) -> ApiResult<Json<QueueResponse>> {
    let entries = state.orchestrator.queue().entries(chat_id).await?;
    Ok(Json(queue_response(chat_id, entries)))
}

/// Put every member back in the queue as waiting
pub async fn reset_queue(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<ChatId>,
) -> ApiResult<Json<QueueResponse>> {
    let entries = state.orchestrator.reset_queue(chat_id).await?;
    Ok(Json(queue_response(chat_id, entries)))
}

/// Drop completed and skipped entries
pub async fn clear_completed(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<ChatId>,
) -> ApiResult<Json<ClearResponse>> {
    let removed = state.orchestrator.clear_completed(chat_id).await?;
    Ok(Json(ClearResponse { removed }))
}

fn queue_response(chat_id: ChatId, entries: Vec<QueueEntry>) -> QueueResponse {
    QueueResponse {
        chat_id,
        waiting: entries
            .iter()
            .filter(|e| e.status == QueueStatus::Waiting)
            .count(),
        entries,
    }
}
