//! Messages: user-to-user mail and system notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::user::UserId;

pub type MessageId = i64;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
  Low,
  #[default]
  Normal,
  High,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageType {
  #[default]
  Message,
  Notification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  pub id:           MessageId,
  /// `None` marks a system notification.
  pub sender_id:    Option<UserId>,
  pub receiver_id:  UserId,
  pub subject:      Option<String>,
  pub content:      String,
  pub is_read:      bool,
  pub priority:     Priority,
  pub message_type: MessageType,
  pub created_at:   DateTime<Utc>,
}

impl Message {
  pub fn involves(&self, user_id: UserId) -> bool {
    self.sender_id == Some(user_id) || self.receiver_id == user_id
  }

  pub fn is_unread_by(&self, user_id: UserId) -> bool {
    self.receiver_id == user_id && !self.is_read
  }
}

/// Input to [`crate::store::RosterStore::create_message`]. `is_read` starts
/// false and `created_at` is set by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub sender_id:    Option<UserId>,
  pub receiver_id:  UserId,
  pub subject:      Option<String>,
  pub content:      String,
  pub priority:     Priority,
  pub message_type: MessageType,
}

impl NewMessage {
  /// A normal-priority user message.
  pub fn new(
    sender_id: Option<UserId>,
    receiver_id: UserId,
    content: impl Into<String>,
  ) -> Self {
    Self {
      sender_id,
      receiver_id,
      subject: None,
      content: content.into(),
      priority: Priority::default(),
      message_type: MessageType::default(),
    }
  }

  pub fn into_message(self, id: MessageId, created_at: DateTime<Utc>) -> Message {
    Message {
      id,
      sender_id: self.sender_id,
      receiver_id: self.receiver_id,
      subject: self.subject,
      content: self.content,
      is_read: false,
      priority: self.priority,
      message_type: self.message_type,
      created_at,
    }
  }
}
