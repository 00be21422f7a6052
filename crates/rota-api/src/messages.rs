//! Handlers for `/messages` endpoints.
//!
//! Every route needs `viewMessages` except sending, which needs
//! `sendMessages`. Callers only ever see messages they sent or received.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rota_core::{
  message::{Message, MessageId, MessageType, NewMessage, Priority},
  permission::{Capability, Denial},
  rules,
  store::RosterStore,
  user::UserId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, CurrentUser, error::ApiError, validate};

/// `GET /messages`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<Message>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewMessages, None)?;
  let messages = state
    .store
    .list_messages_for_user(actor.id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBody {
  pub receiver_id: UserId,
  pub subject:     Option<String>,
  pub content:     String,
  #[serde(default)]
  pub priority:    Priority,
}

/// `POST /messages`. The caller is always the sender.
pub async fn send<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Json(body): Json<SendBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::SendMessages, None)?;
  validate::non_empty("content", &body.content)?;

  let input = NewMessage {
    sender_id:    Some(actor.id),
    receiver_id:  body.receiver_id,
    subject:      body.subject,
    content:      body.content,
    priority:     body.priority,
    message_type: MessageType::Message,
  };
  let message = rules::send_message(&*state.store, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("user", body.receiver_id))?;
  info!(actor = actor.id, id = message.id, receiver = message.receiver_id, "message sent");
  Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
  pub count: usize,
}

/// `GET /messages/unread-count`
pub async fn unread_count<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
) -> Result<Json<UnreadCount>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewMessages, None)?;
  let count = state
    .store
    .unread_message_count(actor.id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(UnreadCount { count }))
}

/// Load a message the caller is allowed to touch. `receiver_only` narrows
/// the allowed party to the receiver.
async fn owned_message<S>(
  state: &AppState<S>,
  actor: UserId,
  id: MessageId,
  receiver_only: bool,
) -> Result<Message, ApiError>
where
  S: RosterStore + 'static,
{
  let message = state
    .store
    .get_message(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("message", id))?;

  let allowed = if receiver_only {
    message.receiver_id == actor
  } else {
    message.involves(actor)
  };
  if !allowed {
    return Err(Denial::NotOwnResource { capability: Capability::ViewMessages }.into());
  }
  Ok(message)
}

/// `POST /messages/:id/read`
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<MessageId>,
) -> Result<Json<Message>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewMessages, None)?;
  owned_message(&state, actor.id, id, true).await?;
  let message = state
    .store
    .mark_message_read(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("message", id))?;
  Ok(Json(message))
}

/// `DELETE /messages/:id`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<MessageId>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewMessages, None)?;
  owned_message(&state, actor.id, id, false).await?;
  if !state.store.delete_message(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("message", id));
  }
  info!(actor = actor.id, id, "message deleted");
  Ok(StatusCode::NO_CONTENT)
}
