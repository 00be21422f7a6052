//! Activities: the append-only audit timeline.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

pub type ActivityId = i64;

/// One audit entry. The description is rendered when the entry is written
/// and cannot be re-derived from the other fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub id:              ActivityId,
  /// Free-form tag, e.g. `approval`, `shift_added`, `department_deleted`.
  #[serde(rename = "type")]
  pub activity_type:   String,
  pub description:     String,
  /// The actor; `None` for system-generated entries.
  pub user_id:         Option<UserId>,
  /// The user the entry is about, if any.
  pub related_user_id: Option<UserId>,
  pub created_at:      DateTime<Utc>,
}

impl Activity {
  /// Timeline order: newest first, higher id first on equal timestamps.
  pub fn newest_first(a: &Self, b: &Self) -> Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
  }
}

#[derive(Debug, Clone)]
pub struct NewActivity {
  pub activity_type:   String,
  pub description:     String,
  pub user_id:         Option<UserId>,
  pub related_user_id: Option<UserId>,
}

impl NewActivity {
  pub fn new(activity_type: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      activity_type: activity_type.into(),
      description: description.into(),
      user_id: None,
      related_user_id: None,
    }
  }

  pub fn by(mut self, actor: Option<UserId>) -> Self {
    self.user_id = actor;
    self
  }

  pub fn about(mut self, subject: Option<UserId>) -> Self {
    self.related_user_id = subject;
    self
  }

  pub fn into_activity(self, id: ActivityId, created_at: DateTime<Utc>) -> Activity {
    Activity {
      id,
      activity_type: self.activity_type,
      description: self.description,
      user_id: self.user_id,
      related_user_id: self.related_user_id,
      created_at,
    }
  }
}
